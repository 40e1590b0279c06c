//! # Entity IDs
//!
//! [`entity_id!`](crate::entity_id) declares a `u32` newtype suitable for
//! [`ActorEntity::Id`](crate::ActorEntity::Id). `entity_id!(pub Order => "order")`
//! expands to `pub struct OrderId(pub u32)` which displays as `order_7`.
//!
//! Extra attributes (for example serde derives) are forwarded to the struct.

#[doc(hidden)]
pub use paste;

#[macro_export]
macro_rules! entity_id {
    ($(#[$meta:meta])* $vis:vis $name:ident => $prefix:literal) => {
        $crate::id::paste::paste! {
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            $vis struct [<$name Id>](pub u32);

            impl From<u32> for [<$name Id>] {
                fn from(raw: u32) -> Self {
                    Self(raw)
                }
            }

            impl std::fmt::Display for [<$name Id>] {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}_{}", $prefix, self.0)
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    crate::entity_id!(Widget => "widget");
    crate::entity_id!(pub(crate) Gadget => "gadget");

    #[test]
    fn test_generated_ids() {
        let id = WidgetId::from(7);
        assert_eq!(id.to_string(), "widget_7");
        assert_eq!(id, WidgetId(7));
        assert!(GadgetId(1) < GadgetId(2));
    }
}
