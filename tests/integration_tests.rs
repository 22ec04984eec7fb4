use std::sync::atomic::AtomicBool;

use svgrab::delivery::{DirectoryDelivery, DownloadOutcome, DownloadRequest, MemoryDelivery};
use svgrab::enumerate::ScanOptions;
use svgrab::export::export_all;
use svgrab::raster::Rasterizer;
use svgrab::session::DialogStatus;
use svgrab::{
    Background, Downloader, ExportRequest, ExportSettings, Page, PageConfig, PageSession, Viewport,
};

const FIVE_GRAPHICS: &str = r#"<html><head><style>.gone { display: none }</style></head><body>
    <svg id="one" width="10" height="10"></svg>
    <svg class="gone" width="10" height="10"></svg>
    <svg id="three" width="10" height="10"></svg>
    <div style="display:none"><svg width="10" height="10"></svg></div>
    <svg id="five" width="10" height="10"></svg>
</body></html>"#;

#[test]
fn visible_only_scan_keeps_document_order() {
    let page = Page::parse(FIVE_GRAPHICS, Viewport::default());
    let all = page.scan(&ScanOptions::default());
    assert_eq!(all.len(), 5);

    let visible = page.scan(&ScanOptions {
        visible_only: true,
        ..Default::default()
    });
    let ids: Vec<&str> = visible.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["svg-0", "svg-2", "svg-4"]);
    let selectors: Vec<&str> = visible.iter().map(|a| a.selector.as_str()).collect();
    assert_eq!(selectors, ["#one", "#three", "#five"]);
}

#[test]
fn graphics_below_the_fold_are_not_visible() {
    let page = Page::parse(
        r#"<svg width="10" height="10"></svg><svg width="10" height="700"></svg><svg width="10" height="10"></svg>"#,
        Viewport {
            width: 800,
            height: 600,
        },
    );
    let visible = page.scan(&ScanOptions {
        visible_only: true,
        limit: 60,
    });
    let indices: Vec<usize> = visible.iter().map(|a| a.index).collect();
    assert_eq!(indices, [0, 1]);
}

#[test]
fn test_load_over_http_with_linked_stylesheet() {
    use tiny_http::{Response, Server};

    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr();

    std::thread::spawn(move || {
        for _ in 0..2 {
            let Ok(req) = server.recv() else {
                return;
            };
            let body = match req.url() {
                "/css/site.css" => "#logo circle { fill: rgb(1, 2, 3) }".to_string(),
                _ => r#"<html><head><link rel="stylesheet" href="css/site.css"></head>
                    <body><svg id="logo" width="8" height="8"><circle cx="4" cy="4" r="4"/></svg></body></html>"#
                    .to_string(),
            };
            let _ = req.respond(Response::from_string(body));
        }
    });

    let url = format!("http://{}/index.html", addr);
    let page = Page::load(&url, &PageConfig::default()).expect("load failed");
    assert_eq!(page.url().map(|u| u.as_str()), Some(url.as_str()));

    let assets = page.scan(&ScanOptions::default());
    assert_eq!(assets.len(), 1);
    assert!(assets[0].asset.styled_form.contains("fill:rgb(1, 2, 3)"));
    assert!(!assets[0].asset.raw_form.contains("rgb(1, 2, 3)"));
}

#[tokio::test]
async fn batch_export_writes_numbered_files() {
    let tmp = tempfile::tempdir().unwrap();
    let page = Page::parse(FIVE_GRAPHICS, Viewport::default());
    let settings = ExportSettings {
        visible_only: true,
        background: Background::White,
        ..Default::default()
    };
    let assets = page.scan(&settings.scan_options());

    let downloader = Downloader::spawn(DirectoryDelivery::new(tmp.path()).unwrap());
    let report = export_all(
        &assets,
        &settings.export_request(),
        settings.style_mode,
        &Rasterizer::new(false),
        &downloader,
        &AtomicBool::new(false),
    )
    .await
    .unwrap();
    downloader.close().await.unwrap();

    assert_eq!(report.exported.len(), 3);
    let mut names: Vec<String> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        ["svg-001-one.png", "svg-003-three.png", "svg-005-five.png"]
    );
    let png = tiny_skia::Pixmap::decode_png(&std::fs::read(tmp.path().join("svg-003-three.png")).unwrap())
        .unwrap();
    assert_eq!((png.width(), png.height()), (20, 20));
}

#[tokio::test]
async fn context_menu_to_download() {
    let page = Page::parse(
        r#"<svg title="Chart / Q1" width="40" height="20"><rect id="bar" width="10" height="20"/></svg>"#,
        Viewport::default(),
    );
    let mut session = PageSession::new(&page);
    let bar = page.element_by_id("bar").unwrap();
    assert!(session.on_context_menu(&bar).is_some());

    let mem = MemoryDelivery::new();
    let downloader = Downloader::spawn(mem.clone());
    let mut dialog = session.open_export_dialog().unwrap();
    dialog.scale_input = "not a number".to_string();
    dialog.background = "white".to_string();
    dialog.style_mode = "raw".to_string();

    let status = dialog.submit(&Rasterizer::new(false), &downloader).await;
    match status {
        DialogStatus::Started { filename, .. } => assert_eq!(filename, "Chart---Q1.png"),
        DialogStatus::Failed(e) => panic!("export failed: {}", e),
    }

    let files = mem.downloads();
    assert_eq!(files.len(), 1);
    assert!(files[0].prompted);
    let png = tiny_skia::Pixmap::decode_png(&files[0].png).unwrap();
    assert_eq!((png.width(), png.height()), (80, 40));
}

#[tokio::test]
async fn delivery_rejects_non_png_references() {
    let downloader = Downloader::spawn(MemoryDelivery::new());
    let outcome = downloader
        .download(DownloadRequest::new(
            "data:image/svg+xml;charset=utf-8,<svg/>",
            "x.png",
            true,
        ))
        .await;
    assert!(matches!(outcome, DownloadOutcome::Failed { .. }));

    let req = ExportRequest::new(1, Background::Transparent);
    let png = Rasterizer::new(false)
        .rasterize(r#"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2"/>"#, 2.0, 2.0, &req)
        .unwrap();
    let outcome = downloader
        .download(DownloadRequest::new(png.to_data_url(), "", true))
        .await;
    assert!(matches!(outcome, DownloadOutcome::Failed { .. }));
}
