use std::fmt;

/// Client-side subscription number, the `LS_subId` of the control request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u32);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A MERGE-mode subscription: the server sends the current state of every
/// item, then one update per change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub items: Vec<String>,
    pub fields: Vec<String>,
    pub snapshot: bool,
}

impl Subscription {
    /// Subscription with snapshot, on the adapter set's default data adapter.
    pub fn merge<I, F>(items: I, fields: F) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            fields: fields.into_iter().map(Into::into).collect(),
            snapshot: true,
        }
    }

    /// `LS_group`: item names separated by spaces.
    pub fn group(&self) -> String {
        self.items.join(" ")
    }

    /// `LS_schema`: field names separated by spaces.
    pub fn schema(&self) -> String {
        self.fields.join(" ")
    }
}
