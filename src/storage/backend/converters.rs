//! Conversions between sea-orm models and the domain types

use sea_orm::ActiveValue::Set;

use crate::storage::models::{Click, Mapping, Offer, OfferStatus, Supplier};
use migration::entities::{click, mapping, offer, supplier};

pub fn model_to_mapping(model: mapping::Model) -> Mapping {
    Mapping {
        id: model.id,
        name: model.name,
        ean: model.ean,
        keywords: model.keywords,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn mapping_to_active_model(m: &Mapping) -> mapping::ActiveModel {
    mapping::ActiveModel {
        id: Set(m.id.clone()),
        name: Set(m.name.clone()),
        ean: Set(m.ean.clone()),
        keywords: Set(m.keywords.clone()),
        created_at: Set(m.created_at),
        updated_at: Set(m.updated_at),
    }
}

pub fn model_to_offer(model: offer::Model) -> Offer {
    // Unknown status text in the database degrades to inactive rather than
    // serving a link we cannot reason about.
    let status = OfferStatus::parse(&model.status).unwrap_or(OfferStatus::Inactive);
    Offer {
        id: model.id,
        mapping_id: model.mapping_id,
        supplier: model.supplier,
        title: model.title,
        url: model.url,
        status,
        price_last_seen: model.price_last_seen,
        deactivated_reason: model.deactivated_reason,
        updated_at: model.updated_at,
    }
}

pub fn offer_to_active_model(o: &Offer) -> offer::ActiveModel {
    offer::ActiveModel {
        id: Set(o.id.clone()),
        mapping_id: Set(o.mapping_id.clone()),
        supplier: Set(o.supplier.clone()),
        title: Set(o.title.clone()),
        url: Set(o.url.clone()),
        status: Set(o.status.as_str().to_string()),
        price_last_seen: Set(o.price_last_seen),
        deactivated_reason: Set(o.deactivated_reason.clone()),
        updated_at: Set(o.updated_at),
    }
}

pub fn model_to_click(model: click::Model) -> Click {
    Click {
        id: model.id,
        mapping_id: model.mapping_id,
        ts: model.ts,
        user_agent: model.user_agent,
        referer: model.referer,
    }
}

pub fn click_to_active_model(c: &Click) -> click::ActiveModel {
    click::ActiveModel {
        id: Set(c.id.clone()),
        mapping_id: Set(c.mapping_id.clone()),
        ts: Set(c.ts),
        user_agent: Set(c.user_agent.clone()),
        referer: Set(c.referer.clone()),
    }
}

pub fn model_to_supplier(model: supplier::Model) -> Supplier {
    Supplier {
        id: model.id,
        name: model.name,
        url: model.url,
        active: model.active,
        created_at: model.created_at,
    }
}

pub fn supplier_to_active_model(s: &Supplier) -> supplier::ActiveModel {
    supplier::ActiveModel {
        id: Set(s.id.clone()),
        name: Set(s.name.clone()),
        url: Set(s.url.clone()),
        active: Set(s.active),
        created_at: Set(s.created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn unknown_status_text_degrades_to_inactive() {
        let model = offer::Model {
            id: "o1".to_string(),
            mapping_id: "m1".to_string(),
            supplier: "amazon".to_string(),
            title: "Test".to_string(),
            url: "https://shop.example/a".to_string(),
            status: "weird".to_string(),
            price_last_seen: None,
            deactivated_reason: None,
            updated_at: Utc::now(),
        };
        assert_eq!(model_to_offer(model).status, OfferStatus::Inactive);
    }

    #[test]
    fn offer_roundtrip_keeps_status_text() {
        let o = Offer {
            id: "o1".to_string(),
            mapping_id: "m1".to_string(),
            supplier: "rewe".to_string(),
            title: "Milk".to_string(),
            url: "https://shop.example/milk".to_string(),
            status: OfferStatus::Active,
            price_last_seen: Some(1.19),
            deactivated_reason: None,
            updated_at: Utc::now(),
        };
        let am = offer_to_active_model(&o);
        assert_eq!(am.status.clone().unwrap(), "active");
    }
}
