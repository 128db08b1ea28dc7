//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Seed-data `name` column value.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }

            /// Look up a status by its database ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Order lifecycle status.
    OrderStatus {
        Pending = 1 => "pending",
        Paid = 2 => "paid",
        InProduction = 3 => "in_production",
        Shipped = 4 => "shipped",
        Cancelled = 5 => "cancelled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_ids_match_seed_order() {
        assert_eq!(OrderStatus::Pending.id(), 1);
        assert_eq!(OrderStatus::Cancelled.id(), 5);
        assert_eq!(StatusId::from(OrderStatus::Shipped), 4);
    }

    #[test]
    fn order_status_round_trips_through_id() {
        for id in 1..=5 {
            let status = OrderStatus::from_id(id).unwrap();
            assert_eq!(status.id(), id);
        }
        assert_eq!(OrderStatus::from_id(9), None);
        assert_eq!(OrderStatus::InProduction.name(), "in_production");
    }
}
