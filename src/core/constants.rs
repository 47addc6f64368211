//! Constants shared across the resolution pipeline.

use std::time::Duration;

/// Default file name of the model weights checkpoint.
pub const WEIGHTS_FILE: &str = "weights.pth";

/// Default file name of the image resizer checkpoint.
pub const RESIZER_FILE: &str = "resizer.pth";

/// Default file name of the vocabulary index.
pub const VOCABULARY_FILE: &str = "tokenizer.json";

/// Default file name of the user settings document.
pub const SETTINGS_FILE: &str = "settings.yaml";

/// Default file name of the persisted resolved document.
pub const RESOLVED_FILE: &str = "resolved.yaml";

/// Known-good source for the vocabulary index.
pub const VOCABULARY_URL: &str =
    "https://raw.githubusercontent.com/lukas-blecher/LaTeX-OCR/main/pix2tex/model/dataset/tokenizer.json";

/// Upper bound for the single remote fetch performed while healing.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// First line of a large-file storage pointer left in place of real content.
pub const STORAGE_POINTER_MARKER: &str = "version https://git-lfs.github.com/spec/";

/// Pointer stubs are tiny; anything larger is judged on its parsed content.
pub const STORAGE_POINTER_MAX_LEN: usize = 1024;

/// Hint attached to fatal asset errors.
pub const LARGE_FILE_HINT: &str =
    "check that large files were fetched (e.g. `git lfs pull`) and the asset directory is correct";

/// Key of the nested decoder sub-schema block.
pub const NESTED_BLOCK_KEY: &str = "decoder_args";

/// Key holding the vocabulary size.
pub const VOCAB_SIZE_KEY: &str = "num_tokens";

/// Parameters that must have exactly one value across the resolved config.
///
/// The top-level value is authoritative; a nested copy is always removed.
pub const SHARED_PARAMETERS: [&str; 4] = ["dim", "heads", "num_layers", VOCAB_SIZE_KEY];

/// Suffix identifying list-encoded `[height, width]` parameters.
pub const DIMENSION_PAIR_SUFFIX: &str = "_dimensions";
