//! Tests for the null holon provider

use hdr_domain::entities::{Holon, HolonFilter, HolonKey, HolonType};
use hdr_domain::ports::HolonProvider;
use hdr_domain::value_objects::ProviderType;
use hdr_providers::NullHolonProvider;

/// Test that the null provider finds nothing and echoes saves
#[tokio::test]
async fn test_null_provider_behaviour() {
    let provider = NullHolonProvider::new(ProviderType::Plan);
    let holon = Holon::new("x", HolonType::Holon);

    assert_eq!(provider.provider_type(), ProviderType::Plan);
    assert!(provider.load_holon(&HolonKey::Id(holon.id)).await.is_err());
    assert!(
        provider
            .load_holons_for_parent(&HolonKey::Id(holon.id), &HolonFilter::default())
            .await
            .expect("children")
            .value
            .is_empty()
    );

    let saved = provider.save_holon(&holon).await.expect("save");
    assert_eq!(saved.value, holon);
}
