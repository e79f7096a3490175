// 🚗 Vehicle export
//
// One v2 Vehicle per `cars` document. Records the v1 carId → v2 id mapping
// that every later stage depends on.

use super::ExportContext;
use crate::coerce::{sanitize_notes, stringify};
use crate::entities::Vehicle;
use crate::ids::IdMap;
use crate::image::{fetch_image_as_data_uri, ImageFetcher};
use crate::legacy::{decode, CarV1};
use crate::source::CARS;
use anyhow::{Context, Result};
use chrono::Utc;

pub fn export_vehicles(
    ctx: &ExportContext,
    fetcher: &dyn ImageFetcher,
    vehicle_ids: &mut IdMap,
) -> Result<Vec<Vehicle>> {
    let mut vehicles = Vec::new();

    for doc in ctx.documents(CARS, Some("carId"))? {
        let car: CarV1 = decode(&doc.data, "car")?;
        let vehicle = transform_car(ctx, fetcher, &car, vehicle_ids)
            .with_context(|| format!("Failed to migrate car {}", car.car_id))?;
        vehicles.push(vehicle);
    }

    Ok(vehicles)
}

fn transform_car(
    ctx: &ExportContext,
    fetcher: &dyn ImageFetcher,
    car: &CarV1,
    vehicle_ids: &mut IdMap,
) -> Result<Vehicle> {
    let policy = ctx.number_policy;
    let mileage = policy.int("mileage", &car.mileage)?;
    let year = policy.int("year", &car.year)?;
    let base64_image = fetch_image_as_data_uri(fetcher, &stringify(&car.image_url))?;

    let vehicle = Vehicle {
        id: vehicle_ids.new_id(&car.car_id),
        name: stringify(&car.name),
        mileage,
        year,
        make: stringify(&car.make),
        model: stringify(&car.model),
        license_plate: stringify(&car.license_plate),
        vin: stringify(&car.vin_number),
        notes: sanitize_notes(&car.notes),
        date_created: Utc::now().timestamp_millis(),
        base64_image,
    };

    tracing::debug!(car_id = %car.car_id, vehicle_id = %vehicle.id, "migrated vehicle");
    Ok(vehicle)
}
