use async_trait::async_trait;
use bench_scraper::models::{load_json_to_store, save_store_to_json};
use bench_scraper::{
    AppError, AppResult, App, Category, Config, DeviceRecord, FetchPool, IdSpace, LookupClient,
    MetricKey, NameResolutionStage, RecordStore, ReportTransformer, ScoreResolutionStage,
    UNKNOWN_SCORE,
};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// 预设结果的查询客户端，同时记录每次调用
#[derive(Default)]
struct ScriptedClient {
    names: HashMap<u32, String>,
    scores: HashMap<(MetricKey, u32), i64>,
    failing_names: HashSet<u32>,
    name_calls: Mutex<Vec<u32>>,
    score_calls: Mutex<Vec<(MetricKey, u32)>>,
}

impl ScriptedClient {
    fn with_name(mut self, id: u32, name: &str) -> Self {
        self.names.insert(id, name.to_string());
        self
    }

    fn with_score(mut self, metric: MetricKey, id: u32, score: i64) -> Self {
        self.scores.insert((metric, id), score);
        self
    }

    fn failing_name(mut self, id: u32) -> Self {
        self.failing_names.insert(id);
        self
    }

    fn name_calls(&self) -> Vec<u32> {
        let mut calls = self.name_calls.lock().unwrap().clone();
        calls.sort_unstable();
        calls
    }

    fn score_calls(&self) -> Vec<(MetricKey, u32)> {
        self.score_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LookupClient for ScriptedClient {
    async fn resolve_name(&self, id: u32, _category: Category) -> AppResult<(u32, String)> {
        self.name_calls.lock().unwrap().push(id);
        if self.failing_names.contains(&id) {
            return Err(AppError::Other(format!("connection reset for {}", id)));
        }
        Ok((id, self.names.get(&id).cloned().unwrap_or_default()))
    }

    async fn resolve_median_score(&self, metric: MetricKey, id: u32) -> AppResult<(u32, i64)> {
        self.score_calls.lock().unwrap().push((metric, id));
        self.scores
            .get(&(metric, id))
            .map(|score| (id, *score))
            .ok_or_else(|| AppError::Other(format!("no median for {}", id)))
    }
}

fn scenario_client() -> ScriptedClient {
    ScriptedClient::default()
        .with_name(1, "Alpha")
        .with_name(2, "")
        .with_name(3, "Beta")
        .with_score(MetricKey::CpuSingleCore, 1, 100)
        .with_score(MetricKey::CpuAllCores, 1, 200)
        .with_score(MetricKey::CpuSingleCore, 3, 50)
        .with_score(MetricKey::CpuAllCores, 3, 90)
}

fn temp_output_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bench_scraper_{}_{}", tag, std::process::id()))
}

fn test_config(output_dir: &PathBuf) -> Config {
    Config {
        max_workers: 4,
        output_dir: output_dir.display().to_string(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let client = Arc::new(scenario_client());
    let dir = temp_output_dir("e2e");
    let app = App::with_client(test_config(&dir), client.clone()).unwrap();

    let space = IdSpace::new(Category::Cpu, 1, 3).unwrap();
    let acquisition = app.acquire(&space).await;

    assert_eq!(acquisition.store.ids(), vec![1, 3]);
    assert_eq!(acquisition.stages.len(), 3);
    assert_eq!(acquisition.stages[0].resolved, 2);
    assert_eq!(acquisition.stages[0].not_found, 1);

    let alpha = acquisition.store.get(1).unwrap();
    assert_eq!(alpha.scores(), [100, 200]);

    let report = app.export(&acquisition.store).unwrap();
    let ids: Vec<u32> = report.rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(report.rows[1].scores, [50, 90]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_name_stage_stays_inside_range() {
    let client = Arc::new(
        ScriptedClient::default()
            .with_name(4, "Intel Core i7-12700K")
            .with_name(9, "Outside"),
    );
    let pool = FetchPool::new(3).unwrap();
    let space = IdSpace::new(Category::Cpu, 3, 7).unwrap();

    let (store, stats) = NameResolutionStage::new(client.clone())
        .run(&pool, &space)
        .await;

    assert_eq!(client.name_calls(), vec![3, 4, 5, 6, 7]);
    assert_eq!(store.ids(), vec![4]);
    assert_eq!(stats.submitted, 5);
    assert_eq!(pool.progress().completed, 5);
}

#[tokio::test]
async fn test_score_stage_only_targets_existing_ids() {
    let client = Arc::new(scenario_client());
    let pool = FetchPool::new(2).unwrap();
    let space = IdSpace::new(Category::Cpu, 1, 3).unwrap();

    let (mut store, _) = NameResolutionStage::new(client.clone())
        .run(&pool, &space)
        .await;
    ScoreResolutionStage::new(client.clone())
        .run(&pool, &mut store)
        .await;

    let calls = client.score_calls();
    assert_eq!(calls.len(), 4);
    assert!(calls.iter().all(|(_, id)| *id != 2));

    // 单核全部完成后才开始全核
    let first_all_cores = calls
        .iter()
        .position(|(m, _)| *m == MetricKey::CpuAllCores)
        .unwrap();
    assert!(calls[..first_all_cores]
        .iter()
        .all(|(m, _)| *m == MetricKey::CpuSingleCore));
    assert_eq!(first_all_cores, 2);
}

#[tokio::test]
async fn test_failed_lookups_are_absorbed() {
    let client = Arc::new(
        ScriptedClient::default()
            .with_name(1, "NVIDIA GeForce RTX 4090")
            .with_name(2, "Radeon RX 7900 XTX")
            .with_name(3, "Intel Arc A770")
            .failing_name(3)
            .with_score(MetricKey::GpuGraphics, 1, 36000)
            .with_score(MetricKey::GpuRaytracing, 1, 25000)
            .with_score(MetricKey::GpuRaytracing, 2, 16000),
    );
    let dir = temp_output_dir("failures");
    let app = App::with_client(test_config(&dir), client.clone()).unwrap();

    let space = IdSpace::new(Category::Gpu, 1, 3).unwrap();
    let acquisition = app.acquire(&space).await;

    // 名称查询失败等同于不存在
    assert_eq!(acquisition.store.ids(), vec![1, 2]);
    // 分数查询失败保留占位值
    let radeon = acquisition.store.get(2).unwrap();
    assert_eq!(radeon.score(MetricKey::GpuGraphics), Some(UNKNOWN_SCORE));
    assert_eq!(radeon.score(MetricKey::GpuRaytracing), Some(16000));

    let report = ReportTransformer::new(0)
        .unwrap()
        .transform(&acquisition.store);
    assert_eq!(report.len(), 1);
    assert_eq!(report.rows[0].vendor, "NVIDIA");
    assert_eq!(report.rows[0].model, "GeForce RTX 4090");
}

#[tokio::test]
async fn test_full_update_then_process_local() {
    let dir = temp_output_dir("full");
    let app = App::with_client(test_config(&dir), Arc::new(scenario_client())).unwrap();

    let space = IdSpace::new(Category::Cpu, 1, 3).unwrap();
    let fetched = app.run_full_update(&space).await.unwrap();

    let json_path = app.output_path(Category::Cpu, "json");
    assert!(json_path.exists());
    assert!(app.output_path(Category::Cpu, "csv").exists());

    let reloaded = load_json_to_store(&json_path).await.unwrap().unwrap();
    assert_eq!(reloaded.ids(), vec![1, 3]);

    let processed = app.run_process_local(&[json_path]).await.unwrap();
    assert_eq!(processed, fetched);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_full_update_writes_header_only_report() {
    let dir = temp_output_dir("header_only");
    let config = Config {
        score_floor: 1000,
        ..test_config(&dir)
    };
    let app = App::with_client(config, Arc::new(scenario_client())).unwrap();

    let space = IdSpace::new(Category::Cpu, 1, 3).unwrap();
    let report = app.run_full_update(&space).await.unwrap();
    assert!(report.is_empty());

    assert!(app.output_path(Category::Cpu, "json").exists());
    let csv = std::fs::read_to_string(app.output_path(Category::Cpu, "csv")).unwrap();
    assert_eq!(
        csv.lines().collect::<Vec<_>>(),
        vec!["CPU ID,Vendor,Model,CPU Name,CPU Single Core Score,CPU All Cores Score"]
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_process_local_merges_last_wins() {
    let dir = temp_output_dir("merge");
    let app = App::with_client(test_config(&dir), Arc::new(ScriptedClient::default())).unwrap();

    let mut first = RecordStore::new(Category::Cpu);
    first
        .insert(DeviceRecord::new(Category::Cpu, 42, "X").with_scores([10, 10]))
        .unwrap();
    first
        .insert(DeviceRecord::new(Category::Cpu, 7, "Intel Core i5-12400").with_scores([5, 5]))
        .unwrap();
    let mut second = RecordStore::new(Category::Cpu);
    second
        .insert(DeviceRecord::new(Category::Cpu, 42, "Y").with_scores([20, 20]))
        .unwrap();

    let first_path = dir.join("first.json");
    let second_path = dir.join("second.json");
    save_store_to_json(&first, &first_path).await.unwrap();
    save_store_to_json(&second, &second_path).await.unwrap();

    let report = app
        .run_process_local(&[first_path.clone(), second_path.clone()])
        .await
        .unwrap();
    let rows: Vec<(u32, &str)> = report.rows.iter().map(|r| (r.id, r.name.as_str())).collect();
    assert_eq!(rows, vec![(42, "Y"), (7, "Intel Core i5-12400")]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_process_local_rejects_structural_errors() {
    let dir = temp_output_dir("structural");
    let app = App::with_client(test_config(&dir), Arc::new(ScriptedClient::default())).unwrap();

    assert!(app.run_process_local(&[]).await.is_err());

    let mut cpu = RecordStore::new(Category::Cpu);
    cpu.insert(DeviceRecord::new(Category::Cpu, 1, "Alpha")).unwrap();
    let mut gpu = RecordStore::new(Category::Gpu);
    gpu.insert(DeviceRecord::new(Category::Gpu, 1, "Beta")).unwrap();

    let cpu_path = dir.join("cpu.json");
    let gpu_path = dir.join("gpu.json");
    save_store_to_json(&cpu, &cpu_path).await.unwrap();
    save_store_to_json(&gpu, &gpu_path).await.unwrap();

    assert!(app.run_process_local(&[cpu_path, gpu_path]).await.is_err());

    let _ = std::fs::remove_dir_all(&dir);
}
