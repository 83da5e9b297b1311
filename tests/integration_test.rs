mod common;

use std::path::Path;
use std::sync::Arc;

use common::{read_csv, workspace, ScriptedGenerator, StaticFetcher, MOCK_RESPONSE, MOCK_TITLE};
use meme_analyzer::infrastructure::ShutdownSignal;
use meme_analyzer::models::{scan_input_files, BatchStats};
use meme_analyzer::services::meme_analyzer::UNKNOWN_MEME_TITLE;
use meme_analyzer::{
    AnalysisRecord, App, BatchProcessor, Config, CsvExporter, CsvSchema, MemeAnalyzer, Mode,
    RunOutcome, NO_INFO,
};

fn processor_with(config: &Config, generator: Arc<ScriptedGenerator>) -> BatchProcessor {
    let analyzer = MemeAnalyzer::new(config, generator, Arc::new(BatchStats::new()));
    BatchProcessor::new(config, Arc::new(analyzer))
}

fn read_artifact(dir: &str, name: &str) -> AnalysisRecord {
    let content = std::fs::read_to_string(Path::new(dir).join(name)).unwrap();
    AnalysisRecord::parse(&content).unwrap()
}

#[tokio::test]
async fn test_end_to_end_batch_writes_artifacts_and_csv() {
    let dir = tempfile::tempdir().unwrap();
    let config = workspace(
        dir.path(),
        &[("A.txt", "무야호 설명"), ("B.txt", ""), ("C.txt", "대박 설명")],
    );
    let generator = Arc::new(ScriptedGenerator::echo(MOCK_RESPONSE));

    let outcome = App::new(config.clone())
        .with_generator(generator.clone())
        .run(Mode::Batch)
        .await
        .unwrap();

    let RunOutcome::Batch { report, export } = outcome else {
        panic!("批处理模式应返回批处理结果");
    };
    assert_eq!(report.total, 3);
    assert_eq!(report.stats.success, 3);
    assert_eq!(report.stats.failure, 0);
    assert_eq!(report.stats.retry, 0);
    assert_eq!(export.rows, 3);
    assert_eq!(generator.calls(), 3);

    let artifacts = scan_input_files(&config.output_dir, "json").await.unwrap();
    let names: Vec<_> = artifacts
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["A.json", "B.json", "C.json"]);

    // 结果文件只保留 JSON 部分
    let raw = std::fs::read_to_string(&artifacts[0]).unwrap();
    assert!(raw.starts_with('{') && raw.ends_with('}'));

    let (header, rows) = read_csv(&config.csv_output_file);
    assert_eq!(
        header,
        vec!["name", "meaning", "usageExamples", "origin", "relatedMemes", "tags"]
    );
    assert_eq!(rows.len(), 3);
    for row in &rows {
        assert_eq!(row[0], MOCK_TITLE);
        assert_eq!(row[1], "기쁨을 표현하는 외침, 환호");
        assert_eq!(row[2], "무야호~ | 그만큼 신나시다는 거지");
        assert_eq!(row[3], "무한도전 \"알래스카\" 편");
        assert_eq!(row[4], NO_INFO);
        assert_eq!(row[5], "무한도전 | 환호");
    }
}

#[tokio::test]
async fn test_transient_failures_are_retried_without_double_counting() {
    let dir = tempfile::tempdir().unwrap();
    let files: Vec<(String, String)> = (0..5)
        .map(|i| (format!("meme_{}.txt", i), format!("밈 {}", i)))
        .collect();
    let file_refs: Vec<(&str, &str)> = files
        .iter()
        .map(|(n, c)| (n.as_str(), c.as_str()))
        .collect();
    let config = workspace(dir.path(), &file_refs);

    // 失败次数小于最大尝试次数，任何文件都不会走到兜底
    let failures = 2;
    let generator = Arc::new(ScriptedGenerator::failing_first(failures, MOCK_RESPONSE));
    let processor = processor_with(&config, generator.clone());

    let report = processor.run(&config.input_dir).await.unwrap();

    assert_eq!(report.total, 5);
    assert_eq!(report.stats.retry, failures);
    assert_eq!(report.stats.success, 5);
    assert_eq!(report.stats.failure, 0);
    assert_eq!(generator.calls(), 5 + failures);

    for entry in processor.queue().drain() {
        let record = AnalysisRecord::parse(&entry).unwrap();
        assert_eq!(record.field("name").unwrap(), MOCK_TITLE);
    }
}

#[tokio::test]
async fn test_always_failing_generator_produces_fallback_records() {
    let dir = tempfile::tempdir().unwrap();
    let long_text = "가".repeat(150);
    let mut config = workspace(
        dir.path(),
        &[
            ("first.txt", "\n\n   개웃기네 진짜\n두 번째 줄"),
            ("empty.txt", "  \n\t\n"),
            ("long.txt", long_text.as_str()),
        ],
    );
    config.max_api_retries = 2;
    let generator = Arc::new(ScriptedGenerator::always_failing());
    let processor = processor_with(&config, generator.clone());

    let report = processor.run(&config.input_dir).await.unwrap();

    assert_eq!(report.stats.success, 3);
    assert_eq!(report.stats.failure, 0);
    assert_eq!(report.stats.retry, 3 * 2);
    assert_eq!(generator.calls(), 3 * 2);

    let first = read_artifact(&config.output_dir, "first.json");
    assert_eq!(first.field("name").unwrap(), "개웃기네 진짜");

    let empty = read_artifact(&config.output_dir, "empty.json");
    assert_eq!(empty.field("name").unwrap(), UNKNOWN_MEME_TITLE);

    let long = read_artifact(&config.output_dir, "long.json");
    let title = long.field("name").unwrap().as_str().unwrap();
    assert!(title.chars().count() < 100);

    let summary = CsvExporter::new(CsvSchema::Rich)
        .export_from_queue(processor.queue(), &config.csv_output_file)
        .await
        .unwrap();
    assert_eq!(summary.rows, 3);
    let (_, rows) = read_csv(&config.csv_output_file);
    assert!(rows.iter().all(|row| row[5] == "분석실패 | 오류"));
}

#[tokio::test]
async fn test_regenerate_csv_from_mixed_schema_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = workspace(dir.path(), &[]);
    let artifact_dir = Path::new(&config.output_dir);
    std::fs::create_dir_all(artifact_dir).unwrap();
    std::fs::write(
        artifact_dir.join("old.json"),
        r#"{"name": "무야호", "meaning": "환호", "tags": ["무한도전"]}"#,
    )
    .unwrap();
    std::fs::write(
        artifact_dir.join("new.json"),
        r#"{
            "title": "킹받네",
            "description": "열받는다는 뜻",
            "origin": "인터넷 커뮤니티",
            "related_memes": ["킹받드라슈"],
            "keywords": ["신조어"],
            "popularity_score": 87
        }"#,
    )
    .unwrap();

    // 批处理目录不存在也不影响重新生成
    let summary = App::new(config.clone()).regenerate_csv().await.unwrap();
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.skipped, 0);

    let (header, rows) = read_csv(&config.regenerated_csv_file);
    assert_eq!(header[0], "name");
    assert_eq!(rows.len(), 2);
    // 文件按路径排序：new.json 在前
    assert_eq!(rows[0][0], "킹받네");
    assert_eq!(rows[0][1], "열받는다는 뜻");
    assert_eq!(rows[0][4], "킹받드라슈");
    assert_eq!(rows[0][5], "신조어");
    assert_eq!(rows[1][0], "무야호");
    assert!(rows.iter().all(|row| row[0] != NO_INFO));
}

#[tokio::test]
async fn test_regenerate_csv_flat_schema() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = workspace(dir.path(), &[]);
    config.csv_schema = CsvSchema::Flat;
    let artifact_dir = Path::new(&config.output_dir);
    std::fs::create_dir_all(artifact_dir).unwrap();
    std::fs::write(
        artifact_dir.join("a.json"),
        r##"{"name": "무야호", "meaning": "환호", "popularity_period": "2021", "tags": ["#무야호", "#무도"]}"##,
    )
    .unwrap();
    std::fs::write(artifact_dir.join("broken.json"), "분석 실패").unwrap();

    let summary = App::new(config.clone()).regenerate_csv().await.unwrap();
    assert_eq!(summary.rows, 1);
    assert_eq!(summary.skipped, 1);

    let (header, rows) = read_csv(&config.regenerated_csv_file);
    assert_eq!(
        header,
        vec!["title", "origin", "usageContext", "trendPeriod", "imgUrl", "hashtags"]
    );
    assert_eq!(
        rows[0],
        vec!["무야호", NO_INFO, "환호", "2021", NO_INFO, "#무야호, #무도"]
    );
}

#[tokio::test]
async fn test_interrupted_batch_makes_no_api_calls() {
    let dir = tempfile::tempdir().unwrap();
    let files: Vec<(String, String)> = (0..20)
        .map(|i| (format!("meme_{:02}.txt", i), format!("밈 {}", i)))
        .collect();
    let file_refs: Vec<(&str, &str)> = files
        .iter()
        .map(|(n, c)| (n.as_str(), c.as_str()))
        .collect();
    let config = workspace(dir.path(), &file_refs);
    let generator = Arc::new(ScriptedGenerator::echo(MOCK_RESPONSE));

    let shutdown = ShutdownSignal::new();
    let analyzer = MemeAnalyzer::new(&config, generator.clone(), Arc::new(BatchStats::new()))
        .with_shutdown(shutdown.clone());
    let processor = BatchProcessor::new(&config, Arc::new(analyzer));
    shutdown.trigger();

    let report = processor.run(&config.input_dir).await.unwrap();

    assert_eq!(report.total, 20);
    assert_eq!(report.stats.success, 0);
    assert_eq!(report.stats.failure, 20);
    assert_eq!(generator.calls(), 0);
    assert!(processor.queue().is_empty());
    assert!(!Path::new(&config.output_dir).exists());
}

#[tokio::test]
async fn test_same_file_name_in_subdirectories_keeps_both_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = workspace(
        dir.path(),
        &[("a/x.txt", "무야호 설명"), ("b/x.txt", "대박 설명")],
    );
    let generator = Arc::new(ScriptedGenerator::echo(MOCK_RESPONSE));

    let outcome = App::new(config.clone())
        .with_generator(generator)
        .run(Mode::Batch)
        .await
        .unwrap();
    let RunOutcome::Batch { report, export } = outcome else {
        panic!("批处理模式应返回批处理结果");
    };
    assert_eq!(report.stats.success, 2);
    assert_eq!(export.rows, 2);

    let output = Path::new(&config.output_dir);
    assert!(output.join("a/x.json").is_file());
    assert!(output.join("b/x.json").is_file());

    // 从结果目录重新生成的行数与批处理 CSV 一致
    let regenerated = App::new(config.clone()).regenerate_csv().await.unwrap();
    assert_eq!(regenerated.rows, export.rows);
    let (_, batch_rows) = read_csv(&config.csv_output_file);
    let (_, regenerated_rows) = read_csv(&config.regenerated_csv_file);
    assert_eq!(batch_rows, regenerated_rows);
}

#[tokio::test]
async fn test_crawl_stages_feed_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = workspace(dir.path(), &[]);
    config.crawl_index_url = "https://namu.wiki/w/index".to_string();
    config.crawl_base_url = "https://namu.wiki".to_string();

    let page = |title: &str| {
        format!(
            "<html><head><title>{title} - 나무위키</title></head><body><nav>메뉴</nav><div class=\"wiki-content\"><p>{title} 설명</p></div></body></html>"
        )
    };
    let fetcher = Arc::new(StaticFetcher::new(vec![
        (
            config.crawl_index_url.clone(),
            r#"<a href="/w/muyaho">무야호</a><a href="/w/kingbatne">킹받네</a><a href="/w/gone">없음</a>"#
                .to_string(),
        ),
        ("https://namu.wiki/w/muyaho".to_string(), page("무야호")),
        ("https://namu.wiki/w/kingbatne".to_string(), page("킹받네")),
    ]));

    let app = App::new(config.clone()).with_fetcher(fetcher.clone());
    let collected = app.run(Mode::CrawlLinks).await.unwrap();
    assert!(matches!(
        collected,
        RunOutcome::LinksCollected { links: 3, pages: 2 }
    ));

    let RunOutcome::Crawled(summary) = app.run(Mode::Crawl).await.unwrap() else {
        panic!("正文抓取模式应返回抓取统计");
    };
    assert_eq!(summary.saved, 2);
    assert_eq!(summary.failed, 0);
    // 汇总页 1 次 + 词条 3 次 + 正文 2 次
    assert_eq!(fetcher.calls(), 6);

    let text = std::fs::read_to_string(Path::new(&config.input_dir).join("무야호_-_나무위키.txt")).unwrap();
    assert!(text.starts_with("제목: 무야호 - 나무위키\n출처: https://namu.wiki/w/muyaho\n"));
    assert!(text.ends_with("본문 내용:\n무야호 설명\n"));

    let generator = Arc::new(ScriptedGenerator::echo(MOCK_RESPONSE));
    let outcome = App::new(config.clone())
        .with_generator(generator.clone())
        .run(Mode::Batch)
        .await
        .unwrap();
    let RunOutcome::Batch { report, export } = outcome else {
        panic!("批处理模式应返回批处理结果");
    };
    assert_eq!(report.total, 2);
    assert_eq!(export.rows, 2);
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn test_missing_input_directory_aborts_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = workspace(dir.path(), &[]);
    config.input_dir = dir.path().join("does_not_exist").display().to_string();
    let generator = Arc::new(ScriptedGenerator::echo(MOCK_RESPONSE));

    let result = App::new(config.clone())
        .with_generator(generator.clone())
        .run(Mode::Batch)
        .await;

    assert!(result.is_err());
    assert_eq!(generator.calls(), 0);
    assert!(!Path::new(&config.csv_output_file).exists());
}

#[tokio::test]
async fn test_regenerate_missing_artifact_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = workspace(dir.path(), &[]);

    let result = App::new(config.clone()).run(Mode::RegenerateCsv).await;

    assert!(result.is_err());
    assert!(!Path::new(&config.regenerated_csv_file).exists());
}

#[tokio::test]
#[ignore] // 需要真实 API 密钥：cargo test -- --ignored
async fn test_live_batch_against_configured_model() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = workspace(
        dir.path(),
        &[("muyaho.txt", "무야호\n무한도전 알래스카 편에서 나온 환호성")],
    );
    let env_config = Config::from_env().expect("加载配置失败");
    config.llm_api_key = env_config.llm_api_key;

    let outcome = App::new(config.clone()).run(Mode::Batch).await.unwrap();
    let RunOutcome::Batch { report, .. } = outcome else {
        panic!("批处理模式应返回批处理结果");
    };
    assert_eq!(report.stats.success, 1);

    let (_, rows) = read_csv(&config.csv_output_file);
    assert_eq!(rows.len(), 1);
}
