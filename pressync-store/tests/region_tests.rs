use pressync_store::{
    DEFAULT_REGION, Region, StoreError, list_regions, region_or_default, resolve_region,
};

#[test]
fn resolves_canonical_code() {
    assert_eq!(resolve_region("ap-northeast-1").unwrap(), Region::ApNortheast1);
}

#[test]
fn resolution_ignores_case_and_separators() {
    let expected = resolve_region("ap-northeast-1").unwrap();
    for name in ["AP_NORTHEAST_1", "Ap-Northeast_1", "ap_northeast-1", "  ap-northeast-1  "] {
        assert_eq!(resolve_region(name).unwrap(), expected, "{name}");
    }
}

#[test]
fn resolves_legacy_aliases() {
    assert_eq!(resolve_region("tokyo").unwrap(), Region::ApNortheast1);
    assert_eq!(resolve_region("IRELAND").unwrap(), Region::EuWest1);
    assert_eq!(resolve_region("northern-virginia").unwrap(), Region::UsEast1);
    assert_eq!(resolve_region("US_STANDARD").unwrap(), Region::UsEast1);
}

#[test]
fn unknown_region_is_not_found() {
    let err = resolve_region("mars-north-1").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    assert!(err.to_string().contains("mars-north-1"));
}

#[test]
fn list_regions_is_deduplicated_and_ordered() {
    let regions = list_regions();
    assert_eq!(regions.first(), Some(&Region::UsEast1));
    for (i, region) in regions.iter().enumerate() {
        assert!(!regions[i + 1..].contains(region), "{region} listed twice");
    }
    assert!(regions.contains(&Region::ApNortheast1));
    assert!(regions.contains(&Region::UsGovWest1));
}

#[test]
fn every_listed_region_resolves_from_its_identifier() {
    for region in list_regions() {
        assert_eq!(resolve_region(&region.identifier()).unwrap(), region);
        assert_eq!(resolve_region(region.code()).unwrap(), region);
    }
}

#[test]
fn identifier_is_upper_snake_case() {
    assert_eq!(Region::ApNortheast1.identifier(), "AP_NORTHEAST_1");
    assert_eq!(Region::UsGovWest1.identifier(), "US_GOV_WEST_1");
}

#[test]
fn default_region_is_tokyo() {
    assert_eq!(DEFAULT_REGION, Region::ApNortheast1);
    assert_eq!(Region::default(), DEFAULT_REGION);
}

#[test]
fn region_or_default_falls_back() {
    assert_eq!(region_or_default(None), DEFAULT_REGION);
    assert_eq!(region_or_default(Some("")), DEFAULT_REGION);
    assert_eq!(region_or_default(Some("   ")), DEFAULT_REGION);
    assert_eq!(region_or_default(Some("nowhere-1")), DEFAULT_REGION);
    assert_eq!(region_or_default(Some("EU_CENTRAL_1")), Region::EuCentral1);
}

#[test]
fn serializes_as_code_and_accepts_any_spelling() {
    let json = serde_json::to_string(&Region::SaEast1).unwrap();
    assert_eq!(json, "\"sa-east-1\"");

    let parsed: Region = serde_json::from_str("\"SA_EAST_1\"").unwrap();
    assert_eq!(parsed, Region::SaEast1);

    assert!(serde_json::from_str::<Region>("\"atlantis\"").is_err());
}

#[test]
fn display_and_from_str() {
    assert_eq!(Region::EuWest1.to_string(), "eu-west-1");
    assert_eq!("eu_west_1".parse::<Region>().unwrap(), Region::EuWest1);
}
