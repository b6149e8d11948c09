#![allow(dead_code)]

use fixit_core::{
    Classification, Client, JobId, JobRequest, Marketplace, OfferRequest, Principal, Provider,
    TradeType, UrgencyLevel,
};

pub const SARAH: Principal = Principal::Client(1);
pub const ROBERT: Principal = Principal::Client(2);
pub const MIKE: Principal = Principal::Provider(3);
pub const ELENA: Principal = Principal::Provider(4);
pub const TOM: Principal = Principal::Provider(5);
pub const ADMIN: Principal = Principal::Admin;

pub const NOW: i64 = 1_700_000_000_000;

pub fn init_logging() {
    engine_logging::initialize_for_tests();
}

pub fn marketplace() -> Marketplace {
    Marketplace::new(
        vec![
            Client {
                id: 1,
                name: "Sarah Jenkins".to_string(),
                address: "123 Maple Ave, Springfield".to_string(),
            },
            Client {
                id: 2,
                name: "Robert Miller".to_string(),
                address: "45 Oak Lane, Springfield".to_string(),
            },
        ],
        vec![
            provider(3, "Mike Torque", TradeType::Plumbing, 4.8, 142),
            provider(4, "Elena Watts", TradeType::Electrical, 4.9, 87),
            provider(5, "Tom Chill", TradeType::Hvac, 4.5, 210),
        ],
    )
}

fn provider(id: u64, name: &str, trade: TradeType, rating: f32, jobs_completed: u32) -> Provider {
    Provider {
        id,
        name: name.to_string(),
        trade,
        rating,
        jobs_completed,
        is_available: true,
    }
}

pub fn classification(category: TradeType, urgency: UrgencyLevel) -> Classification {
    Classification {
        category,
        urgency,
        estimated_price_range: "$100 - $200".to_string(),
        summary: "Clogged Kitchen Drain".to_string(),
    }
}

pub fn request(description: &str, category: TradeType) -> JobRequest {
    JobRequest {
        description: description.to_string(),
        classification: classification(category, UrgencyLevel::Normal),
        scheduled_at: None,
        image: None,
    }
}

pub fn post(market: &mut Marketplace, client: Principal, description: &str, category: TradeType) -> JobId {
    market
        .create_job(client, request(description, category), NOW)
        .expect("create job")
}

pub fn offer(price: &str, message: &str) -> OfferRequest {
    OfferRequest {
        price: price.to_string(),
        message: message.to_string(),
    }
}
