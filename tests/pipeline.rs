//! Rendered board markup through extraction and normalization.

use jobscrape::models::{LocationKey, RawBlock};
use jobscrape::normalize::{
    normalize_salary, parse_salary_value, sort_by_salary, tagify, LocationMatcher, Normalizer,
};
use jobscrape::scrapers::{extract_blocks, ListSelectors};

const BOARD: &str = r#"
<div class="notion-table-view">
  <div data-block-id="0f1e-2d3c" data-index="0">
    <div data-col-index="0">Hiring</div>
    <div data-col-index="1">Staff Data Engineer</div>
    <div data-col-index="2">Globex No access</div>
    <div data-col-index="3">Data</div>
    <div data-col-index="4">Remote</div>
    <div data-col-index="5"><div data-popup>Untied States</div><div data-popup>Canada</div></div>
    <div data-col-index="6">Python, Spark, , Airflow</div>
    <div data-col-index="7">market rate, $180k+</div>
  </div>
  <div data-block-id="9a8b-7c6d" data-index="1">
    <div data-col-index="0">Hiring</div>
    <div data-col-index="1">Product Designer</div>
    <div data-col-index="2">No access</div>
    <div data-col-index="5">Mars</div>
    <div data-col-index="6">UI, UX,  , Design</div>
    <div data-col-index="7">$150k - $200k</div>
  </div>
  <div data-block-id="0f1e-2d3c" data-index="2">
    <div data-col-index="0">Reposted</div>
    <div data-col-index="1">Staff Data Engineer (copy)</div>
  </div>
  <div data-block-id="5555-6666" data-index="3">
    <div data-col-index="0">Open</div>
    <div data-col-index="1">Security Lead</div>
    <div data-col-index="7">> $300k</div>
  </div>
</div>
"#;

fn normalizer() -> Normalizer {
    Normalizer::new("https://jobs.example.site", LocationMatcher::default())
}

#[test]
fn board_markup_to_listings() {
    let blocks = extract_blocks(BOARD, &ListSelectors::default()).unwrap();
    assert_eq!(blocks.len(), 4);

    let listings = normalizer().normalize(blocks);
    let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["0f1e-2d3c", "9a8b-7c6d", "5555-6666"]);

    let data = &listings[0];
    assert_eq!(data.formatted_id, "0f1e2d3c");
    assert_eq!(data.apply_link, "https://jobs.example.site/0f1e2d3c");
    assert_eq!(data.properties.title.as_deref(), Some("Staff Data Engineer"));
    assert_eq!(data.properties.company.as_deref(), Some("Globex"));
    assert_eq!(data.properties.category.as_deref(), Some("Data"));
    assert_eq!(data.properties.remote_policy.as_deref(), Some("Remote"));
    assert_eq!(data.properties.location.as_deref(), Some("Untied States, Canada"));
    assert_eq!(
        data.properties.location_tags,
        vec![LocationKey::UnitedStates, LocationKey::Canada]
    );
    assert_eq!(data.properties.skills, vec!["Python", "Spark", "Airflow"]);
    assert_eq!(data.properties.salary_range, Some(vec!["$180k+".to_string()]));

    let design = &listings[1];
    assert_eq!(design.properties.company, None);
    assert_eq!(design.properties.location_tags, vec![LocationKey::Anywhere]);
    assert_eq!(design.properties.skills, vec!["UI", "UX", "Design"]);
    assert_eq!(
        design.properties.salary_range,
        Some(vec!["$150k - $200k".to_string()])
    );

    let security = &listings[2];
    assert_eq!(security.properties.salary_range, Some(vec!["$300k+".to_string()]));
}

#[test]
fn listings_serialize_in_camel_case() {
    let blocks = extract_blocks(BOARD, &ListSelectors::default()).unwrap();
    let listings = normalizer().normalize(blocks);
    let json = serde_json::to_value(&listings[0]).unwrap();

    assert_eq!(json["rowIndex"], 0);
    assert_eq!(json["formattedId"], "0f1e2d3c");
    assert_eq!(json["properties"]["remotePolicy"], "Remote");
    assert_eq!(
        json["properties"]["locationTags"],
        serde_json::json!(["UNITED STATES", "CANADA"])
    );
    assert_eq!(json["properties"]["salaryRange"], serde_json::json!(["$180k+"]));
}

#[test]
fn salary_sort_orders_by_upper_bound() {
    let blocks = extract_blocks(BOARD, &ListSelectors::default()).unwrap();
    let mut listings = normalizer().normalize(blocks);
    sort_by_salary(&mut listings);

    let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["5555-6666", "9a8b-7c6d", "0f1e-2d3c"]);
}

#[test]
fn one_malformed_row_does_not_sink_the_batch() {
    let blocks = vec![
        RawBlock::new("bad", 0, vec![None, Some("   ".to_string()), Some("???".to_string())]),
        RawBlock::new("empty", 1, Vec::new()),
        RawBlock::new("good", 2, vec![Some("Open".to_string())]),
    ];
    let listings = normalizer().normalize(blocks);

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].id, "bad");
    assert_eq!(listings[0].properties.title, None);
    assert_eq!(listings[0].properties.company.as_deref(), Some("???"));
    assert_eq!(listings[1].id, "good");
}

#[test]
fn normalization_literals() {
    assert_eq!(normalize_salary("$300k +"), Some(vec!["$300k+".to_string()]));
    assert_eq!(normalize_salary("+$300k"), Some(vec!["$300k+".to_string()]));
    assert_eq!(
        normalize_salary("$150k - $200k"),
        Some(vec!["$150k - $200k".to_string()])
    );
    assert_eq!(
        normalize_salary("market rate, $180k+"),
        Some(vec!["$180k+".to_string()])
    );
    assert_eq!(normalize_salary("Market Rate"), None);

    assert_eq!(parse_salary_value("> $300k"), 300);
    assert_eq!(parse_salary_value("$150k - $200k"), 200);
    assert_eq!(parse_salary_value(""), 0);

    assert_eq!(tagify("UI, UX,  , Design"), vec!["UI", "UX", "Design"]);

    let matcher = LocationMatcher::default();
    assert_eq!(matcher.resolve("UNITED STATES"), LocationKey::UnitedStates);
    assert_eq!(matcher.resolve("Untied States"), LocationKey::UnitedStates);
    assert_eq!(matcher.resolve("Mars"), LocationKey::Anywhere);
}
