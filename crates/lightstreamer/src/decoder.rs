//! Field value decoding for `U` notifications.
//!
//! Values are `|` separated. An empty value means unchanged, `#` is null, `$`
//! is the empty string and `^N` stands for N unchanged fields in a row.
//! Anything else is percent-encoded text.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use crate::error::ProtocolError;
use crate::subscription::{Subscription, SubscriptionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Unchanged,
    Null,
    Value(String),
}

/// Decodes the value part of an update into exactly `field_count` entries.
/// Missing trailing fields count as unchanged.
pub fn decode_values(raw: &str, field_count: usize) -> Result<Vec<FieldValue>, ProtocolError> {
    let mut out = Vec::with_capacity(field_count);

    for token in raw.split('|') {
        match token {
            "" => out.push(FieldValue::Unchanged),
            "#" => out.push(FieldValue::Null),
            "$" => out.push(FieldValue::Value(String::new())),
            _ if token.starts_with('^') => match token[1..].parse::<usize>() {
                Ok(n) => {
                    // The run length comes off the wire; bound it before allocating.
                    if n > field_count - out.len() {
                        return Err(too_many(field_count));
                    }
                    out.extend(std::iter::repeat_n(FieldValue::Unchanged, n));
                }
                Err(_) => out.push(FieldValue::Value(percent_decoded(token)?)),
            },
            _ => out.push(FieldValue::Value(percent_decoded(token)?)),
        }
        if out.len() > field_count {
            return Err(too_many(field_count));
        }
    }

    out.resize(field_count, FieldValue::Unchanged);
    Ok(out)
}

fn too_many(field_count: usize) -> ProtocolError {
    ProtocolError::TooManyFields {
        expected: field_count,
    }
}

fn percent_decoded(token: &str) -> Result<String, ProtocolError> {
    percent_decode_str(token)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| ProtocolError::InvalidUtf8)
}

/// Full state of one item after an update, with the fields that changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUpdate {
    pub subscription: SubscriptionId,
    pub item: String,
    fields: Vec<String>,
    values: Vec<Option<String>>,
    changed: Vec<bool>,
}

impl ItemUpdate {
    /// Update in which every given field changed.
    pub fn from_pairs<'a>(
        subscription: SubscriptionId,
        item: impl Into<String>,
        pairs: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
    ) -> Self {
        let (fields, values): (Vec<_>, Vec<_>) = pairs
            .into_iter()
            .map(|(f, v)| (f.to_string(), v.map(str::to_string)))
            .unzip();
        let changed = vec![true; fields.len()];
        Self {
            subscription,
            item: item.into(),
            fields,
            values,
            changed,
        }
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// Current value of `field`, `None` for null or unknown fields.
    pub fn value(&self, field: &str) -> Option<&str> {
        self.position(field)
            .and_then(|i| self.values[i].as_deref())
    }

    pub fn is_changed(&self, field: &str) -> bool {
        self.position(field).is_some_and(|i| self.changed[i])
    }
}

struct SubscriptionState {
    items: Vec<String>,
    fields: Vec<String>,
    last: Vec<Vec<Option<String>>>,
}

/// Keeps the last known values per item so partial updates can be expanded.
#[derive(Default)]
pub struct UpdateDecoder {
    subscriptions: HashMap<u32, SubscriptionState>,
}

impl UpdateDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: SubscriptionId, subscription: &Subscription) {
        self.subscriptions.insert(
            id.0,
            SubscriptionState {
                items: subscription.items.clone(),
                fields: subscription.fields.clone(),
                last: vec![vec![None; subscription.fields.len()]; subscription.items.len()],
            },
        );
    }

    pub fn remove(&mut self, id: SubscriptionId) {
        self.subscriptions.remove(&id.0);
    }

    /// Forgets item values, keeps registrations. Used when a new session starts.
    pub fn reset(&mut self) {
        for state in self.subscriptions.values_mut() {
            for values in &mut state.last {
                values.fill(None);
            }
        }
    }

    /// `item` is the 1-based position from the `U` notification.
    pub fn decode(
        &mut self,
        subscription: u32,
        item: usize,
        raw: &str,
    ) -> Result<ItemUpdate, ProtocolError> {
        let state = self
            .subscriptions
            .get_mut(&subscription)
            .ok_or(ProtocolError::UnknownSubscription(subscription))?;

        if item == 0 || item > state.items.len() {
            return Err(ProtocolError::ItemOutOfRange { subscription, item });
        }

        let decoded = decode_values(raw, state.fields.len())?;
        let last = &mut state.last[item - 1];
        let mut changed = vec![false; decoded.len()];

        for (i, value) in decoded.into_iter().enumerate() {
            match value {
                FieldValue::Unchanged => {}
                FieldValue::Null => {
                    last[i] = None;
                    changed[i] = true;
                }
                FieldValue::Value(v) => {
                    last[i] = Some(v);
                    changed[i] = true;
                }
            }
        }

        Ok(ItemUpdate {
            subscription: SubscriptionId(subscription),
            item: state.items[item - 1].clone(),
            fields: state.fields.clone(),
            values: last.clone(),
            changed,
        })
    }
}
