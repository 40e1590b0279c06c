//! [`ActorEntity`] implementation for [`Service`].

use crate::error::CatalogError;
use crate::model::{Service, ServiceCreate, ServiceId, ServiceUpdate};
use actor_framework::{ActorEntity, Unsupported};
use async_trait::async_trait;
use rust_decimal::Decimal;

fn invalid(field: &'static str, reason: impl Into<String>) -> CatalogError {
    CatalogError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[async_trait]
impl ActorEntity for Service {
    type Id = ServiceId;
    type Create = ServiceCreate;
    type Update = ServiceUpdate;
    type Action = Unsupported;
    type ActionResult = ();
    type Context = ();
    type Error = CatalogError;

    fn from_create_params(id: ServiceId, params: ServiceCreate) -> Result<Self, CatalogError> {
        let mut service = Self {
            id,
            name: String::new(),
            unit_price: Decimal::ZERO,
            unit: params.unit,
        };
        service.set_name(params.name)?;
        service.set_price(params.unit_price)?;
        Ok(service)
    }

    async fn on_update(&mut self, update: ServiceUpdate, _ctx: &()) -> Result<(), CatalogError> {
        if let Some(name) = update.name {
            self.set_name(name)?;
        }
        if let Some(price) = update.unit_price {
            self.set_price(price)?;
        }
        if let Some(unit) = update.unit {
            self.unit = unit;
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: Unsupported, _ctx: &()) -> Result<(), CatalogError> {
        match action {}
    }
}

impl Service {
    fn set_name(&mut self, name: String) -> Result<(), CatalogError> {
        if name.trim().is_empty() {
            return Err(invalid("name", "service name must not be empty"));
        }
        self.name = name;
        Ok(())
    }

    fn set_price(&mut self, price: Decimal) -> Result<(), CatalogError> {
        if price < Decimal::ZERO {
            return Err(invalid("unit_price", format!("{price} is negative")));
        }
        self.unit_price = price;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_price_must_not_be_negative() {
        let err = Service::from_create_params(
            ServiceId(1),
            ServiceCreate {
                name: "Wash&Fold".into(),
                unit_price: dec!(-1),
                unit: "kg".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Invalid { field: "unit_price", .. }));

        let mut service = Service::from_create_params(
            ServiceId(1),
            ServiceCreate {
                name: "Wash&Fold".into(),
                unit_price: dec!(2500),
                unit: "kg".into(),
            },
        )
        .unwrap();
        let update = ServiceUpdate {
            name: Some(" ".into()),
            ..ServiceUpdate::default()
        };
        assert!(service.on_update(update, &()).await.is_err());
        assert_eq!(service.name, "Wash&Fold");
    }
}
