use serde_json::{json, Value};
use tracing::{debug, warn};
use crate::error::ValidationError;
use super::types::{ConfigRecord, Field, BOX_CAPACITY, MAX_BOXES, MAX_PARTY_SIZE};

/// Validated Faulty Technology configuration for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultyTech {
    pub(super) config: ConfigRecord,
}

impl FaultyTech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from a record that has not been vetted yet
    pub fn from_record(record: ConfigRecord) -> Result<Self, ValidationError> {
        record.check()?;
        Ok(Self { config: record.normalized() })
    }

    /// Returns a copy of every field
    pub fn to_record(&self) -> ConfigRecord {
        self.config
    }

    /// Replaces every field without per-field validation.
    ///
    /// Only trusted records come through here: ones produced by `to_record`,
    /// read back from the saved-run store (checked on load), restored from the
    /// signed session cookie, or the defaults. Fewer swap-ins is dropped when
    /// swap-ins are off.
    pub fn load_record(&mut self, record: ConfigRecord) {
        self.config = record.normalized();
    }

    /// Restores the default configuration
    pub fn reset(&mut self) {
        self.load_record(ConfigRecord::default());
    }

    /// Sets one field from a loosely typed value.
    ///
    /// Flags coerce truthily, every other field must coerce to an integer.
    /// A rejected change leaves the configuration exactly as it was.
    pub fn set_field(&mut self, field: Field, raw: &Value) -> Result<(), ValidationError> {
        let result = self.apply(field, raw);
        match &result {
            Ok(()) => debug!(field = %field, value = %raw, "configuration updated"),
            Err(e) => {
                warn!(field = %field, value = %raw, error = %e, "configuration change rejected")
            }
        }
        result
    }

    fn apply(&mut self, field: Field, raw: &Value) -> Result<(), ValidationError> {
        if field.is_flag() {
            let value = truthy(raw);
            match field {
                Field::SwapIns => {
                    self.config.swapins = value;
                    // fewer swap-ins only means something while swap-ins are picked
                    if !value {
                        self.config.diff_swaps = false;
                    }
                }
                Field::Shifts => self.config.shifts = value,
                _ if value && !self.config.swapins => {
                    return Err(ValidationError::FewerSwapInsWithoutSwapIns);
                }
                _ => self.config.diff_swaps = value,
            }
            return Ok(());
        }

        let value = coerce_int(field, raw)?;
        if value < 0 {
            return Err(ValidationError::Negative { field, value });
        }

        if field == Field::Boxed {
            self.config.boxed = u32::try_from(value).map_err(|_| ValidationError::NotAnInteger {
                field,
                raw: raw.to_string(),
            })?;
            return Ok(());
        }

        if value > MAX_PARTY_SIZE as i64 || (field == Field::PartySize && value == 0) {
            return Err(ValidationError::NotAPartySize { field, value });
        }
        let value = value as u8;
        match field {
            Field::Min if value > self.config.max => Err(ValidationError::MinAboveMax {
                min: value,
                max: self.config.max,
            }),
            Field::Max if value < self.config.min => Err(ValidationError::MaxBelowMin {
                min: self.config.min,
                max: value,
            }),
            Field::Min => {
                self.config.min = value;
                Ok(())
            }
            Field::Max => {
                self.config.max = value;
                Ok(())
            }
            _ => {
                self.config.party_size = value;
                Ok(())
            }
        }
    }

    /// Clicks a party slot: the last filled slot empties, any other slot fills up to it
    pub fn toggle_party_slot(&mut self, slot: u8) -> Result<(), ValidationError> {
        if slot == 0 || slot > MAX_PARTY_SIZE {
            return Err(ValidationError::SlotOutOfRange {
                what: "party slot",
                value: slot as u32,
                limit: MAX_PARTY_SIZE as u32,
            });
        }
        let target = if slot == self.config.party_size {
            slot.saturating_sub(1).max(1)
        } else {
            slot
        };
        self.set_field(Field::PartySize, &json!(target))
    }

    /// Clicks a slot of a storage box, same toggling rule as the party
    pub fn toggle_box_slot(&mut self, box_number: u32, slot: u32) -> Result<(), ValidationError> {
        if box_number == 0 || box_number > MAX_BOXES {
            return Err(ValidationError::SlotOutOfRange {
                what: "box",
                value: box_number,
                limit: MAX_BOXES,
            });
        }
        if slot == 0 || slot > BOX_CAPACITY {
            return Err(ValidationError::SlotOutOfRange {
                what: "box slot",
                value: slot,
                limit: BOX_CAPACITY,
            });
        }
        let clicked = slot + (box_number - 1) * BOX_CAPACITY;
        let target = if clicked == self.config.boxed { clicked - 1 } else { clicked };
        self.set_field(Field::Boxed, &json!(target))
    }

    /// Boxes needed to show every stored member, never fewer than one
    pub fn box_count(&self) -> u32 {
        self.config.boxed.div_ceil(BOX_CAPACITY).max(1)
    }
}

fn truthy(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn coerce_int(field: Field, raw: &Value) -> Result<i64, ValidationError> {
    let not_an_integer = || ValidationError::NotAnInteger {
        field,
        raw: raw.to_string(),
    };
    match raw {
        Value::Bool(b) => Ok(*b as i64),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if n.as_u64().is_some() {
                Ok(i64::MAX)
            } else {
                // fractional values truncate toward zero
                match n.as_f64() {
                    Some(f) if f.is_finite() => Ok(f.trunc() as i64),
                    _ => Err(not_an_integer()),
                }
            }
        }
        Value::String(s) => s.trim().parse().map_err(|_| not_an_integer()),
        _ => Err(not_an_integer()),
    }
}
