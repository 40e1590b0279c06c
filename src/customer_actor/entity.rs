//! [`ActorEntity`] implementation for [`Customer`].

use crate::error::CatalogError;
use crate::model::{Customer, CustomerCreate, CustomerId, CustomerUpdate};
use actor_framework::{ActorEntity, Unsupported};
use async_trait::async_trait;

fn require_name(name: &str) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::Invalid {
            field: "name",
            reason: "customer name must not be empty".into(),
        });
    }
    Ok(())
}

#[async_trait]
impl ActorEntity for Customer {
    type Id = CustomerId;
    type Create = CustomerCreate;
    type Update = CustomerUpdate;
    type Action = Unsupported;
    type ActionResult = ();
    type Context = ();
    type Error = CatalogError;

    fn from_create_params(id: CustomerId, params: CustomerCreate) -> Result<Self, CatalogError> {
        require_name(&params.name)?;
        Ok(Self {
            id,
            name: params.name,
            phone: params.phone,
            address: params.address,
        })
    }

    async fn on_update(&mut self, update: CustomerUpdate, _ctx: &()) -> Result<(), CatalogError> {
        if let Some(name) = update.name {
            require_name(&name)?;
            self.name = name;
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(address) = update.address {
            self.address = Some(address);
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: Unsupported, _ctx: &()) -> Result<(), CatalogError> {
        match action {}
    }
}
