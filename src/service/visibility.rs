// service/visibility.rs
use uuid::Uuid;

use crate::{
    error::ErrorMessage,
    models::propertymodel::Property,
    service::error::ServiceError,
};

/// Deleted listings are invisible; unlisted ones only to their agent.
pub fn can_view(property: &Property, requester_id: Option<Uuid>) -> bool {
    !property.deleted && (property.listed || requester_id == Some(property.agent_id))
}

pub fn can_mutate(property: &Property, requester_id: Uuid) -> bool {
    !property.deleted && requester_id == property.agent_id
}

/// Resolves an optional lookup into a property the requester may see.
/// Anything invisible is reported as missing so its existence does not leak.
pub fn require_visible(
    property: Option<Property>,
    requester_id: Option<Uuid>,
) -> Result<Property, ServiceError> {
    match property {
        Some(p) if can_view(&p, requester_id) => Ok(p),
        _ => Err(ServiceError::NotFound(ErrorMessage::PropertyNotFound.to_string())),
    }
}

/// Gate for every write: missing or deleted is `NotFound`, someone else's
/// listing is `Forbidden`.
pub fn require_owner(
    property: Option<Property>,
    requester_id: Uuid,
) -> Result<Property, ServiceError> {
    let property = property
        .filter(|p| !p.deleted)
        .ok_or_else(|| ServiceError::NotFound(ErrorMessage::PropertyNotFound.to_string()))?;

    if !can_mutate(&property, requester_id) {
        return Err(ServiceError::Forbidden(ErrorMessage::PermissionDenied.to_string()));
    }

    Ok(property)
}

/// Featured listings first; the relative order inside each group is kept.
pub fn featured_first(mut properties: Vec<Property>) -> Vec<Property> {
    properties.sort_by_key(|p| !p.featured);
    properties
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn sample_property(agent_id: Uuid) -> Property {
        Property {
            id: Uuid::new_v4(),
            title: "2BHK flat".to_string(),
            description: None,
            property_type: "Apartment".to_string(),
            purpose: Some("ForSale".to_string()),
            price: 5_000_000.0,
            area: 1000.0,
            bhk: Some(2),
            bathrooms: Some(2),
            balconies: Some(1),
            floor: None,
            total_floors: None,
            facing: None,
            furnishing: None,
            age: None,
            amenities: None,
            city: Some("Ahmedabad".to_string()),
            address: None,
            location: None,
            pin_code: Some("380001".to_string()),
            photos: None,
            agent_id,
            agent_name: None,
            agent_email: None,
            listed: true,
            deleted: false,
            featured: false,
            views: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_deleted_is_invisible_to_everyone() {
        let agent = Uuid::new_v4();
        let mut property = sample_property(agent);
        property.deleted = true;

        assert!(!can_view(&property, None));
        assert!(!can_view(&property, Some(agent)));
        assert!(!can_mutate(&property, agent));
        assert!(matches!(
            require_visible(Some(property.clone()), Some(agent)),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            require_owner(Some(property), agent),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_unlisted_visible_only_to_owner() {
        let agent = Uuid::new_v4();
        let mut property = sample_property(agent);
        property.listed = false;

        assert!(can_view(&property, Some(agent)));
        assert!(!can_view(&property, Some(Uuid::new_v4())));
        assert!(!can_view(&property, None));
    }

    #[test]
    fn test_listed_visible_to_anyone() {
        let property = sample_property(Uuid::new_v4());
        assert!(can_view(&property, None));
        assert!(can_view(&property, Some(Uuid::new_v4())));
    }

    #[test]
    fn test_only_owner_mutates() {
        let agent = Uuid::new_v4();
        let property = sample_property(agent);

        assert!(require_owner(Some(property.clone()), agent).is_ok());
        assert!(matches!(
            require_owner(Some(property), Uuid::new_v4()),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            require_owner(None, agent),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_featured_first_is_stable() {
        let agent = Uuid::new_v4();
        let mut a = sample_property(agent);
        a.title = "a".into();
        let mut b = sample_property(agent);
        b.title = "b".into();
        b.featured = true;
        let mut c = sample_property(agent);
        c.title = "c".into();
        let mut d = sample_property(agent);
        d.title = "d".into();
        d.featured = true;

        let ordered: Vec<String> = featured_first(vec![a, b, c, d])
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(ordered, vec!["b", "d", "a", "c"]);
    }
}
