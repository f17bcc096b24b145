//! 파일시스템에서 advisory 문서 로딩
//!
//! [`DocumentLoader`]는 [`SchemaConfig`]의 크기 제한과 확장자 목록을 적용하여
//! 문서 파일을 읽고 디코딩합니다.
//!
//! # Note
//!
//! 동기 I/O를 수행합니다. async 컨텍스트에서 호출할 때는
//! `tokio::task::spawn_blocking`으로 감싸세요.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::SchemaConfig;
use crate::document::{Document, decode_document_from};
use crate::error::SchemaError;
use crate::version::SchemaVersionGate;

/// 파일에서 로드된 문서
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// 원본 파일 경로
    pub path: PathBuf,
    /// 디코딩된 문서
    pub document: Document,
}

/// advisory 문서 로더
pub struct DocumentLoader {
    config: SchemaConfig,
    gate: SchemaVersionGate,
}

impl DocumentLoader {
    /// 로더를 생성합니다. 설정은 호출자가 미리 검증해야 합니다.
    pub fn new(config: SchemaConfig) -> Self {
        let gate = config.gate();
        Self { config, gate }
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// 문서 파일 하나를 로드합니다.
    ///
    /// 파일 크기가 `max_document_size`를 넘으면 읽기 전에 거부합니다.
    /// 확인 후 파일이 커지더라도 `max_document_size + 1` 바이트까지만 읽습니다.
    pub fn load_file(&self, path: &Path) -> Result<LoadedDocument, SchemaError> {
        let shown = path.display().to_string();
        let max = self.config.max_document_size;
        let io_err = |e| SchemaError::Io {
            path: shown.clone(),
            source: e,
        };

        let size = fs::metadata(path).map_err(io_err)?.len();
        if size > max {
            return Err(SchemaError::FileTooBig {
                path: shown,
                size,
                max,
            });
        }

        let file = File::open(path).map_err(io_err)?;
        let bytes = match read_limited(file, max).map_err(io_err)? {
            Limited::Within(bytes) => bytes,
            Limited::Exceeded(size) => {
                return Err(SchemaError::FileTooBig {
                    path: shown,
                    size,
                    max,
                });
            }
        };

        let document = decode_document_from(bytes.as_slice(), &shown)?;
        debug!(path = %shown, package = document.name(), "loaded document file");

        Ok(LoadedDocument {
            path: path.to_path_buf(),
            document,
        })
    }

    /// 디렉토리에서 문서 파일 목록을 찾습니다.
    ///
    /// 재귀 탐색은 하지 않으며, 설정된 확장자를 가진 일반 파일만 경로 순으로 반환합니다.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, SchemaError> {
        let io_err = |e| SchemaError::Io {
            path: dir.display().to_string(),
            source: e,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| self.config.is_document_extension(ext));
            if matches {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// 디렉토리의 모든 문서를 로드합니다.
    ///
    /// 파일별 결과를 반환하며, 한 파일의 실패가 나머지 로딩을 막지 않습니다.
    pub fn load_dir(
        &self,
        dir: &Path,
    ) -> Result<Vec<(PathBuf, Result<LoadedDocument, SchemaError>)>, SchemaError> {
        let paths = self.discover(dir)?;

        let results: Vec<_> = paths
            .into_iter()
            .map(|path| {
                let result = self.load_file(&path);
                if let Err(e) = &result {
                    warn!(path = %path.display(), error = %e, "failed to load document");
                }
                (path, result)
            })
            .collect();

        let loaded = results.iter().filter(|(_, r)| r.is_ok()).count();
        info!(
            dir = %dir.display(),
            total = results.len(),
            loaded,
            failed = results.len() - loaded,
            "loaded advisory documents"
        );

        Ok(results)
    }

    /// 파일을 로드하고 설정된 게이트로 검증합니다.
    pub fn validate_file(&self, path: &Path) -> Result<LoadedDocument, SchemaError> {
        let loaded = self.load_file(path)?;
        loaded
            .document
            .validate_with(&self.gate)
            .map_err(|source| SchemaError::Invalid {
                path: path.display().to_string(),
                source,
            })?;
        Ok(loaded)
    }
}

/// 제한된 읽기 결과
#[derive(Debug, PartialEq, Eq)]
enum Limited {
    Within(Vec<u8>),
    /// 제한을 넘음. 값은 실제로 읽은 바이트 수 (최대 `max + 1`)
    Exceeded(u64),
}

/// `max` 바이트를 넘는 입력은 `max + 1` 바이트에서 읽기를 멈춥니다.
fn read_limited(reader: impl Read, max: u64) -> io::Result<Limited> {
    let mut bytes = Vec::new();
    reader.take(max.saturating_add(1)).read_to_end(&mut bytes)?;

    let read = bytes.len() as u64;
    if read > max {
        return Ok(Limited::Exceeded(read));
    }
    Ok(Limited::Within(bytes))
}
