//! End-to-end campaign tests against a mock chronicle site.
//!
//! Exercises the full pipeline: pagination walk, filter discovery, the
//! per-filter re-walks and the merge semantics of the record store.

use chronik::config::FetchConfig;
use chronik::crawl::CrawlDriver;
use chronik::fetch::Fetcher;
use chronik::sites::{HessenSchautHin, ResponseChronik};
use chronik::store::RecordStore;
use url::Url;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn article(token: &str, heading: &str, date: &str, body: &str, source: Option<(&str, &str)>) -> String {
    let source_block = match source {
        Some((name, href)) => format!(
            r#"<div class="field-name-field-source"><ul class="item-list">
               <li>Quelle: <a href="{href}">{name}</a></li></ul></div>"#
        ),
        None => String::new(),
    };
    format!(
        r#"<article class="{token} node-chronicle">
           <h2 class="node__title node-title">{heading}</h2>
           <span class="date-display-single">{date}</span>
           <p>{body}</p>
           {source_block}
           </article>"#
    )
}

fn page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

fn fast_fetcher() -> Fetcher {
    Fetcher::new(&FetchConfig {
        max_attempts: 2,
        initial_backoff_ms: 1,
        max_backoff_ms: 2,
        ..FetchConfig::default()
    })
    .expect("fetcher should build")
}

async fn store() -> RecordStore {
    let store = RecordStore::in_memory().await.expect("in-memory store");
    store.init_schema().await.expect("schema");
    store
}

const FILTERS: &str = r#"
    <select id="edit-field-district-tid">
      <option value="All">- Alle -</option>
      <option value="12">Kassel (Landkreis)</option>
    </select>
    <select id="edit-field-motivation-tid">
      <option value="All">- Alle -</option>
      <option value="7">Rassismus</option>
    </select>
"#;

#[tokio::test]
async fn full_response_campaign_walks_pages_and_filters() {
    let server = MockServer::start().await;

    let kassel = article(
        "node-1",
        "Kassel: Angriff auf Geflüchtete",
        "3. März 2021",
        "Am Abend wurde...",
        Some(("HNA", "https://hna.de/x")),
    );
    let broken = article("node-2", "Frankfurt: Beleidigung", "kein Datum", "Kaputt.", None);
    let wiesbaden = article(
        "node-3",
        "Wiesbaden: Bedrohung",
        "5. März 2021",
        "Gegen Mittag...",
        None,
    );

    // Page 1: filters, two fragments (one malformed), next link.
    Mock::given(method("GET"))
        .and(path("/chronik"))
        .and(query_param_is_missing("page"))
        .and(query_param_is_missing("field_district_tid"))
        .and(query_param_is_missing("field_motivation_tid"))
        .respond_with(page(&format!(
            r#"<html><body>{FILTERS}{kassel}{broken}
               <ul class="pager"><li class="pager-next"><a href="/chronik?page=1">weiter</a></li></ul>
               </body></html>"#
        )))
        .expect(1)
        .mount(&server)
        .await;

    // Page 2: last page of the unfiltered walk.
    Mock::given(method("GET"))
        .and(path("/chronik"))
        .and(query_param("page", "1"))
        .respond_with(page(&format!("<html><body>{wiesbaden}</body></html>")))
        .expect(1)
        .mount(&server)
        .await;

    // County-filtered listing re-lists the Kassel record, single page.
    Mock::given(method("GET"))
        .and(path("/chronik"))
        .and(query_param("field_district_tid", "12"))
        .respond_with(page(&format!("<html><body>{kassel}</body></html>")))
        .expect(1)
        .mount(&server)
        .await;

    // Motive-filtered listing re-lists the Wiesbaden record, single page.
    Mock::given(method("GET"))
        .and(path("/chronik"))
        .and(query_param("field_motivation_tid", "7"))
        .respond_with(page(&format!("<html><body>{wiesbaden}</body></html>")))
        .expect(1)
        .mount(&server)
        .await;

    let store = store().await;
    let fetcher = fast_fetcher();
    let driver = CrawlDriver::new(&fetcher, &store);
    let adapter = ResponseChronik::with_base(Url::parse(&server.uri()).expect("mock uri"));

    let stats = driver.run_campaign(&adapter).await.expect("campaign");

    assert_eq!(stats.pages_fetched, 4);
    // node-1 twice, node-3 twice, node-2 skipped both... node-2 only on page 1.
    assert_eq!(stats.incidents_stored, 4);
    assert_eq!(stats.fragments_skipped, 1);
    assert_eq!(stats.walks_aborted, 0);

    // Canonical URL from phase 1 survives the county pass, the tag lands.
    let kassel_row = store
        .incident("response-node-1")
        .await
        .expect("query")
        .expect("stored");
    assert_eq!(kassel_row.city.as_deref(), Some("Kassel"));
    assert_eq!(kassel_row.title, "Angriff auf Geflüchtete");
    assert_eq!(kassel_row.date, "2021-03-03");
    assert_eq!(kassel_row.url.as_deref(), Some(format!("{}/chronik", server.uri()).as_str()));
    assert_eq!(kassel_row.county.as_deref(), Some("Kassel (Landkreis)"));
    assert_eq!(kassel_row.motives, None);

    let wiesbaden_row = store
        .incident("response-node-3")
        .await
        .expect("query")
        .expect("stored");
    assert_eq!(
        wiesbaden_row.url.as_deref(),
        Some(format!("{}/chronik?page=1", server.uri()).as_str())
    );
    assert_eq!(wiesbaden_row.motives.as_deref(), Some("Rassismus"));
    assert_eq!(wiesbaden_row.county, None);

    // The source observed on both passes collapsed to one row, and the
    // counter only reflects the actual insert.
    let sources = store.sources_for("response-node-1").await.expect("query");
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].name, "HNA");
    assert_eq!(stats.sources_stored, 1);

    // The chronicle reference row was written.
    let counts = store.counts_by_chronicler().await.expect("counts");
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].chronicler_name, "response.");
    assert_eq!(counts[0].incidents, 2);
}

#[tokio::test]
async fn pagination_terminates_after_the_last_page() {
    let server = MockServer::start().await;

    let pages = 3u32;
    for i in 0..pages {
        let body = article(
            &format!("node-{i}"),
            "Stadt: Vorfall",
            "1. Januar 2022",
            "Text.",
            None,
        );
        let next = if i + 1 < pages {
            format!(
                r#"<ul class="pager"><li class="pager-next"><a href="/chronik?page={}">weiter</a></li></ul>"#,
                i + 1
            )
        } else {
            String::new()
        };

        let mock = Mock::given(method("GET")).and(path("/chronik"));
        let mock = if i == 0 {
            mock.and(query_param_is_missing("page"))
        } else {
            mock.and(query_param("page", i.to_string()))
        };
        mock.respond_with(page(&format!("<html><body>{body}{next}</body></html>")))
            .expect(1)
            .mount(&server)
            .await;
    }

    let store = store().await;
    let fetcher = fast_fetcher();
    let driver = CrawlDriver::new(&fetcher, &store);
    let adapter = ResponseChronik::with_base(Url::parse(&server.uri()).expect("mock uri"));

    let stats = driver.run_campaign(&adapter).await.expect("campaign");

    // No filter selects on these pages, so only the unfiltered walk runs,
    // visiting each page exactly once.
    assert_eq!(stats.pages_fetched, pages);
    assert_eq!(stats.incidents_stored, pages);
}

#[tokio::test]
async fn failed_filtered_walk_leaves_earlier_results_intact() {
    let server = MockServer::start().await;

    let kassel = article(
        "node-1",
        "Kassel: Angriff",
        "3. März 2021",
        "Text.",
        None,
    );

    Mock::given(method("GET"))
        .and(path("/chronik"))
        .and(query_param_is_missing("field_district_tid"))
        .and(query_param_is_missing("field_motivation_tid"))
        .respond_with(page(&format!("<html><body>{FILTERS}{kassel}</body></html>")))
        .expect(1)
        .mount(&server)
        .await;

    // Both filtered listings are broken.
    Mock::given(method("GET"))
        .and(path("/chronik"))
        .and(query_param("field_district_tid", "12"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/chronik"))
        .and(query_param("field_motivation_tid", "7"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = store().await;
    let fetcher = fast_fetcher();
    let driver = CrawlDriver::new(&fetcher, &store);
    let adapter = ResponseChronik::with_base(Url::parse(&server.uri()).expect("mock uri"));

    let stats = driver.run_campaign(&adapter).await.expect("campaign");

    assert_eq!(stats.walks_aborted, 2);
    assert_eq!(stats.incidents_stored, 1);

    let row = store
        .incident("response-node-1")
        .await
        .expect("query")
        .expect("phase 1 result survives");
    assert_eq!(row.url.as_deref(), Some(format!("{}/chronik", server.uri()).as_str()));
    assert_eq!(row.county, None);
}

#[tokio::test]
async fn single_page_successor_walk_applies_the_cutoff() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chronik/"))
        .respond_with(page(
            r#"<html><body>
               <article class="chronik-eintrag" id="e-1">
                 <h2 class="eintrag-titel">Gießen: Bedrohung</h2>
                 <span class="eintrag-datum">12. Mai 2021</span>
                 <p>Ein Mann wurde bedroht.</p>
                 <p>Quelle: siehe Zeitung</p>
               </article>
               <article class="chronik-eintrag" id="e-2">
                 <h2 class="eintrag-titel">Altfall</h2>
                 <span class="eintrag-datum">30. Dezember 2019</span>
                 <p>Schon erfasst.</p>
               </article>
               </body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let store = store().await;
    let fetcher = fast_fetcher();
    let driver = CrawlDriver::new(&fetcher, &store);
    let page_url = Url::parse(&format!("{}/chronik/", server.uri())).expect("mock uri");
    let adapter = HessenSchautHin::with_page(page_url);

    let stats = driver.run_campaign(&adapter).await.expect("campaign");

    assert_eq!(stats.pages_fetched, 1);
    assert_eq!(stats.incidents_stored, 1);
    assert_eq!(stats.fragments_skipped, 1);

    let row = store
        .incident("hessenschauthin-e-1")
        .await
        .expect("query")
        .expect("stored");
    assert_eq!(row.chronicler_name, "Hessen schaut hin");
    assert_eq!(row.date, "2021-05-12");

    let sources = store.sources_for("hessenschauthin-e-1").await.expect("query");
    assert_eq!(
        sources.iter().map(|s| (s.name.as_str(), s.url.as_deref())).collect::<Vec<_>>(),
        vec![("siehe Zeitung", None)]
    );

    assert!(store.incident("hessenschauthin-e-2").await.expect("query").is_none());
}
