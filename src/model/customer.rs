//! A laundry customer.
//!
//! Customers are collaborators of the fulfillment core: orders reference them and the ledger
//! uses their name in posting descriptions. See [`crate::customer_actor`] for the entity impl.
use actor_framework::entity_id;
use serde::{Deserialize, Serialize};

entity_id!(#[derive(Serialize, Deserialize)] pub Customer => "customer");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Payload for creating a customer.
#[derive(Debug, Clone, Default)]
pub struct CustomerCreate {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl CustomerCreate {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}
