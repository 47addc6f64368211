//! End-to-end resolution tests over temporary asset directories.

use image::RgbImage;
use mathocr::core::assets::AssetFetcher;
use mathocr::core::errors::{BoxError, FailureKind};
use mathocr::{
    AssetLayout, EngineArgs, EngineCell, EngineFactory, FormulaEngine, Pipeline, ResolutionState,
    ResolvedConfig, defaults,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

const STUB: &str = "version https://git-lfs.github.com/spec/v1\n\
oid sha256:4d7a214614ab2935c943f9e0ff69d22eadbb8f32b1258daaa5e2ca24d17e2393\n\
size 12345\n";

fn vocabulary(entries: usize) -> String {
    let vocab: serde_json::Map<String, serde_json::Value> = (0..entries)
        .map(|i| (format!("tok{i}"), serde_json::Value::from(i)))
        .collect();
    serde_json::json!({ "model": { "type": "BPE", "vocab": vocab } }).to_string()
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// Weights, resizer and a vocabulary with `entries` tokens.
    fn new(entries: usize) -> Self {
        let fixture = Self::without_vocabulary();
        fixture.write("tokenizer.json", &vocabulary(entries));
        fixture
    }

    fn without_vocabulary() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let fixture = Self { dir };
        fixture.write("weights.pth", "weights");
        fixture.write("resizer.pth", "resizer");
        fixture
    }

    fn write(&self, name: &str, contents: &str) {
        fs::write(self.dir.path().join(name), contents).unwrap();
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn layout(&self) -> AssetLayout {
        AssetLayout::new(self.path())
            .with_vocabulary_url(Some("https://example.invalid/tokenizer.json".into()))
    }

    fn pipeline(&self, fetcher: Arc<CountingFetcher>) -> Pipeline {
        Pipeline::new(self.layout()).with_fetcher(fetcher)
    }
}

struct CountingFetcher {
    body: String,
    calls: AtomicUsize,
}

impl CountingFetcher {
    fn serving(body: String) -> Arc<Self> {
        Arc::new(Self {
            body,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AssetFetcher for CountingFetcher {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone().into_bytes())
    }
}

struct EchoEngine {
    args: EngineArgs,
}

impl FormulaEngine for EchoEngine {
    fn recognize(&self, _image: &RgbImage) -> Result<String, BoxError> {
        Ok(format!("h={}", self.args.parameters().heads))
    }
}

struct CountingFactory {
    builds: AtomicUsize,
    fail: bool,
}

impl CountingFactory {
    fn new() -> Self {
        Self {
            builds: AtomicUsize::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            builds: AtomicUsize::new(0),
            fail: true,
        }
    }

    fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl EngineFactory for &CountingFactory {
    type Engine = EchoEngine;

    fn build(&self, args: EngineArgs) -> Result<EchoEngine, BoxError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        // slow enough for concurrent callers to pile up on the cell
        std::thread::sleep(std::time::Duration::from_millis(20));
        if self.fail {
            return Err("unexpected keyword argument 'heads'".into());
        }
        Ok(EchoEngine { args })
    }
}

#[test]
fn test_empty_settings_resolve_to_defaults() {
    let entries = defaults().typed().num_tokens;
    let fixture = Fixture::new(entries);
    fixture.write("settings.yaml", "");

    let resolution = fixture.pipeline(CountingFetcher::serving(String::new())).resolve().unwrap();
    assert_eq!(resolution.handle.config(), defaults().typed());
}

#[test]
fn test_missing_settings_resolve_to_defaults_with_artifact_vocab_size() {
    let fixture = Fixture::new(5);

    let resolution = fixture.pipeline(CountingFetcher::serving(String::new())).resolve().unwrap();
    let config = resolution.handle.config();
    assert_eq!(config.num_tokens, 5);
    assert_eq!(config.max_height, defaults().typed().max_height);
    assert_eq!(config.decoder_args, defaults().typed().decoder_args);
}

#[test]
fn test_dimension_list_is_expanded() {
    let fixture = Fixture::new(10);
    fixture.write("settings.yaml", "max_dimensions: [800, 400]\nmin_dimensions: [16, 24]\n");

    let resolution = fixture.pipeline(CountingFetcher::serving(String::new())).resolve().unwrap();
    let config = resolution.handle.config();
    assert_eq!((config.max_height, config.max_width), (800, 400));
    assert_eq!((config.min_height, config.min_width), (16, 24));
}

#[test]
fn test_stub_vocabulary_is_healed_and_measured() {
    let fixture = Fixture::without_vocabulary();
    fixture.write("tokenizer.json", STUB);
    let fetcher = CountingFetcher::serving(vocabulary(42));

    let resolution = fixture.pipeline(Arc::clone(&fetcher)).resolve().unwrap();
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(resolution.manifest.vocab_size, 42);
    assert_eq!(resolution.handle.config().num_tokens, 42);

    let healed = fs::read_to_string(fixture.path().join("tokenizer.json")).unwrap();
    assert!(!healed.starts_with("version https://git-lfs"));
    serde_json::from_str::<serde_json::Value>(&healed).unwrap();

    // now intact: a second resolution does not fetch
    fixture.pipeline(Arc::clone(&fetcher)).resolve().unwrap();
    assert_eq!(fetcher.calls(), 1);
}

#[test]
fn test_nested_shared_parameter_is_dropped() {
    let fixture = Fixture::new(10);
    fixture.write(
        "settings.yaml",
        "decoder_args:\n  heads: 16\n  cross_attend: false\n",
    );

    let resolution = fixture.pipeline(CountingFetcher::serving(String::new())).resolve().unwrap();
    let config = resolution.handle.config();
    assert_eq!(config.heads, 8);
    assert!(!config.decoder_args.contains_key("heads"));
    assert_eq!(
        config.decoder_args.get("cross_attend"),
        Some(&serde_yaml::Value::Bool(false))
    );

    let persisted = fs::read_to_string(resolution.handle.path()).unwrap();
    let document: serde_yaml::Value = serde_yaml::from_str(&persisted).unwrap();
    assert!(document["decoder_args"].get("heads").is_none());
    assert_eq!(document["heads"], serde_yaml::Value::from(8u64));
}

#[test]
fn test_missing_weights_fail_before_settings_are_read() {
    let fixture = Fixture::new(10);
    fs::remove_file(fixture.path().join("weights.pth")).unwrap();
    // would be a ConfigParse failure if it were ever loaded
    fixture.write("settings.yaml", "{ not: [valid yaml");
    let fetcher = CountingFetcher::serving(vocabulary(10));

    let (result, history) = fixture.pipeline(Arc::clone(&fetcher)).resolve_traced();
    let err = result.unwrap_err();
    assert_eq!(err.kind(), FailureKind::AssetMissing);
    assert!(err.is_fatal());
    assert_eq!(
        history,
        vec![
            ResolutionState::Uninitialized,
            ResolutionState::Failed(FailureKind::AssetMissing)
        ]
    );
    assert_eq!(fetcher.calls(), 0);
    assert!(!fixture.path().join("resolved.yaml").exists());
}

#[test]
fn test_invalid_settings_are_a_config_error() {
    let fixture = Fixture::new(10);
    fixture.write("settings.yaml", "- just\n- a list\n");

    let (result, history) = fixture.pipeline(CountingFetcher::serving(String::new())).resolve_traced();
    assert_eq!(result.unwrap_err().kind(), FailureKind::ConfigParse);
    assert_eq!(history.last(), Some(&ResolutionState::Failed(FailureKind::ConfigParse)));
}

#[test]
fn test_persisted_document_matches_memory() {
    let fixture = Fixture::new(300);
    fixture.write(
        "settings.yaml",
        "max_dimensions: [640, 320]\nmax_height: 700\ntemperature: 1\nunknown_option: 3\n",
    );

    let resolution = fixture.pipeline(CountingFetcher::serving(String::new())).resolve().unwrap();
    let reread = ResolvedConfig::from_file(resolution.handle.path()).unwrap();
    assert_eq!(&reread, resolution.handle.config());
    assert_eq!(reread, resolution.handle.reload().unwrap());
    assert_eq!((reread.max_height, reread.max_width), (700, 320));
    assert_eq!(reread.temperature, 1.0);
}

#[test]
fn test_full_run_reaches_engine_with_arguments() {
    let fixture = Fixture::new(10);
    let factory = CountingFactory::new();

    let recognizer = fixture
        .pipeline(CountingFetcher::serving(String::new()))
        .run(&&factory)
        .unwrap();
    let args = &recognizer.engine().args;
    assert!(args.no_cuda && args.no_gui);
    assert_eq!(args.checkpoint, fixture.path().join("weights.pth"));
    assert_eq!(args.resizer, fixture.path().join("resizer.pth"));
    assert_eq!(args.config_path(), recognizer.config_path());
    assert!(args.config_path().exists());
    assert_eq!(recognizer.predict(&RgbImage::new(16, 16)), "$h=8$");
    assert_eq!(factory.builds(), 1);
}

#[test]
fn test_concurrent_cold_start_builds_once() {
    let fixture = Fixture::without_vocabulary();
    fixture.write("tokenizer.json", STUB);
    let fetcher = CountingFetcher::serving(vocabulary(12));
    let factory = CountingFactory::new();
    let cell = EngineCell::new(fixture.pipeline(Arc::clone(&fetcher)), &factory);

    let engines: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| std::ptr::from_ref(cell.get().unwrap()) as usize))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(factory.builds(), 1);
    assert_eq!(fetcher.calls(), 1);
    assert!(engines.windows(2).all(|pair| pair[0] == pair[1]));
    assert!(cell.is_resolved());
    assert_eq!(cell.predict(&RgbImage::new(4, 4)), "$h=8$");
}

#[test]
fn test_failed_cold_start_is_cached_for_every_caller() {
    let fixture = Fixture::new(10);
    let factory = CountingFactory::failing();
    let cell = EngineCell::new(fixture.pipeline(CountingFetcher::serving(String::new())), &factory);

    let messages: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| match cell.get() {
                    Ok(_) => panic!("engine must not be built"),
                    Err(e) => {
                        assert_eq!(e.kind(), FailureKind::EngineInit);
                        e.to_string()
                    }
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(factory.builds(), 1);
    assert!(messages.windows(2).all(|pair| pair[0] == pair[1]));
    assert!(cell.get().is_err());
    assert_eq!(factory.builds(), 1);
    assert!(cell.predict(&RgbImage::new(4, 4)).starts_with("[engine unavailable"));
}
