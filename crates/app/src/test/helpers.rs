//! Test Helpers

use std::sync::{Arc, Mutex};

use tracing::{
    Subscriber,
    dispatcher::DefaultGuard,
    span::{Attributes, Id},
};
use tracing_subscriber::{
    layer::{Context, Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::{
    domain::{
        locations::{
            LocationsService, LocationsServiceError,
            data::NewLocation,
            records::{LocationRecord, LocationUuid},
        },
        services::{
            ServiceLifecycle, ServiceLifecycleError,
            data::{NewService, ServiceFields, ServiceUpdate},
            records::{Milestones, ServiceRecord, ServiceUuid},
        },
    },
    test::TestContext,
};

pub(crate) fn service_fields() -> ServiceFields {
    ServiceFields {
        invoice_number: "F-1001".to_string(),
        client_name: "Carla Soto".to_string(),
        rut: None,
        contact: "+56 9 8765 4321".to_string(),
        email: Some("carla@example.com".to_string()),
        product: "Smartphone".to_string(),
        sku: Some("SM-A54".to_string()),
        failure_description: Some("Pantalla rota".to_string()),
        repair_cost: Some(35_000),
        notes: None,
    }
}

pub(crate) fn new_service(location: LocationUuid) -> NewService {
    NewService {
        fields: service_fields(),
        location_uuid: location,
        entry_date: None,
        status: None,
        milestones: Milestones::default(),
    }
}

pub(crate) async fn create_location(
    ctx: &TestContext,
    name: &str,
) -> Result<LocationRecord, LocationsServiceError> {
    ctx.locations
        .create_location(
            ctx.owner_uuid,
            NewLocation {
                name: name.to_string(),
                address: None,
            },
        )
        .await
}

pub(crate) async fn create_service(
    ctx: &TestContext,
    location: LocationUuid,
) -> Result<ServiceRecord, ServiceLifecycleError> {
    ctx.services
        .create_service(ctx.owner_uuid, new_service(location))
        .await
}

/// Move a service to `to`, leaving everything else as stored.
pub(crate) async fn move_service(
    ctx: &TestContext,
    service: ServiceUuid,
    to: LocationUuid,
) -> Result<ServiceRecord, ServiceLifecycleError> {
    let current = ctx.services.get_service(ctx.owner_uuid, service).await?;

    ctx.services
        .update_service(
            ctx.owner_uuid,
            service,
            ServiceUpdate {
                location_uuid: to,
                ..ServiceUpdate::from(&current.service)
            },
        )
        .await
}

/// Names of the spans opened on this thread while the guard is alive.
#[derive(Debug, Clone, Default)]
pub(crate) struct SpanNames(Arc<Mutex<Vec<&'static str>>>);

impl SpanNames {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.0
            .lock()
            .is_ok_and(|names| names.iter().any(|recorded| *recorded == name))
    }
}

impl<S: Subscriber> Layer<S> for SpanNames {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        if let Ok(mut names) = self.0.lock() {
            names.push(attrs.metadata().name());
        }
    }
}

/// Record span names for the current thread until the guard drops.
pub(crate) fn record_spans() -> (SpanNames, DefaultGuard) {
    let spans = SpanNames::default();

    let guard = tracing_subscriber::registry()
        .with(spans.clone())
        .set_default();

    (spans, guard)
}
