use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The lifecycle state of an order line.
///
/// The set is open: labels the export uses that do not map onto one of the
/// well-known states are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Delivered,
    Shipped,
    Pending,
    Cancelled,
    Returned,
    Other(String),
}

impl OrderStatus {
    /// Label given to lines whose status was left blank.
    pub const UNKNOWN: &'static str = "Unknown";

    /// Classifies a raw status label. A blank label becomes `Other("Unknown")`.
    ///
    /// Any label mentioning "cancel" is a cancellation, whatever else it says.
    /// The export uses compound labels such as "Shipped - Delivered to Buyer",
    /// so the more specific outcomes are checked before the generic prefixes.
    pub fn parse(raw: &str) -> Self {
        let label = raw.trim();
        let lower = label.to_lowercase();

        if label.is_empty() {
            OrderStatus::Other(Self::UNKNOWN.to_string())
        } else if lower.contains("cancel") {
            OrderStatus::Cancelled
        } else if lower.contains("return") || lower.contains("rejected") {
            OrderStatus::Returned
        } else if lower.contains("delivered") {
            OrderStatus::Delivered
        } else if lower.starts_with("shipped") || lower == "shipping" {
            OrderStatus::Shipped
        } else if lower.starts_with("pending") || lower == "unshipped" {
            OrderStatus::Pending
        } else {
            OrderStatus::Other(label.to_string())
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Pending => "Pending",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Returned => "Returned",
            OrderStatus::Other(label) => label,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Statuses travel as their display label so the canonical CSV stays readable.
impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(OrderStatus::parse(&raw))
    }
}

/// Who ships the order: the marketplace itself or the seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Fulfilment {
    /// Shipped from the platform's own warehouses ("Amazon" in the export).
    #[serde(alias = "Amazon")]
    Platform,
    /// Self-fulfilled by the seller ("Merchant" in the export).
    #[serde(alias = "Merchant")]
    Merchant,
}

impl Fulfilment {
    /// Maps an export label onto a fulfilment type. Returns `None` for blank
    /// or unknown labels so the caller can apply its own defaulting rule.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "amazon" | "platform" => Some(Fulfilment::Platform),
            "merchant" | "seller" | "self" => Some(Fulfilment::Merchant),
            _ => None,
        }
    }

    /// The `fulfilled_by` value used when the export leaves it blank.
    pub fn default_fulfilled_by(&self) -> &'static str {
        match self {
            Fulfilment::Platform => "Amazon",
            Fulfilment::Merchant => "Self",
        }
    }
}

impl fmt::Display for Fulfilment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fulfilment::Platform => f.write_str("Platform"),
            Fulfilment::Merchant => f.write_str("Merchant"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_wins_over_other_words() {
        assert_eq!(OrderStatus::parse("Shipped - Cancelled"), OrderStatus::Cancelled);
        assert_eq!(OrderStatus::parse("cancelled"), OrderStatus::Cancelled);
    }

    #[test]
    fn compound_export_labels_are_classified() {
        assert_eq!(
            OrderStatus::parse("Shipped - Delivered to Buyer"),
            OrderStatus::Delivered
        );
        assert_eq!(
            OrderStatus::parse("Shipped - Returned to Seller"),
            OrderStatus::Returned
        );
        assert_eq!(OrderStatus::parse("Shipped - Out for Delivery"), OrderStatus::Shipped);
        assert_eq!(
            OrderStatus::parse("Pending - Waiting for Pick Up"),
            OrderStatus::Pending
        );
    }

    #[test]
    fn unknown_labels_are_kept_verbatim() {
        let status = OrderStatus::parse("  Lost in Transit ");
        assert_eq!(status, OrderStatus::Other("Lost in Transit".to_string()));
        assert_eq!(status.to_string(), "Lost in Transit");
    }

    #[test]
    fn blank_labels_become_unknown() {
        assert_eq!(OrderStatus::parse(""), OrderStatus::Other("Unknown".to_string()));
        assert_eq!(OrderStatus::parse("   ").as_str(), "Unknown");
    }

    #[test]
    fn fulfilment_labels() {
        assert_eq!(Fulfilment::parse("Amazon"), Some(Fulfilment::Platform));
        assert_eq!(Fulfilment::parse(" merchant "), Some(Fulfilment::Merchant));
        assert_eq!(Fulfilment::parse(""), None);
        assert_eq!(Fulfilment::Platform.default_fulfilled_by(), "Amazon");
        assert_eq!(Fulfilment::Merchant.default_fulfilled_by(), "Self");
    }
}
