//! Upload conversion pipeline. One upload produces two complete renderings
//! of the source PDF, one per paper size, published into the cache only
//! after both variants have fully rasterized.

use crate::normalizer::{self, PdfInfo};
use crate::rasterizer::Rasterizer;
use printpoint_cache::{validate_basename, PageCache};
use printpoint_core::models::PaperSize;
use printpoint_core::AppError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of a completed upload conversion.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub letter_urls: Vec<String>,
    pub legal_urls: Vec<String>,
    pub total_pages: u32,
    pub original_size: PaperSize,
}

#[derive(Clone)]
pub struct Converter {
    cache: Arc<dyn PageCache>,
    rasterizer: Rasterizer,
}

impl Converter {
    pub fn new(cache: Arc<dyn PageCache>, rasterizer: Rasterizer) -> Self {
        Self { cache, rasterizer }
    }

    /// Convert the incoming PDF for `basename` into both cache partitions.
    ///
    /// Stages: clear both partitions, inspect the source, normalize both
    /// variants in parallel, rasterize both in parallel into staging, then
    /// publish. The transient source PDF is deleted on every exit path.
    #[tracing::instrument(skip(self))]
    pub async fn convert(&self, basename: &str) -> Result<ConversionOutcome, AppError> {
        validate_basename(basename)?;
        let source = self.cache.incoming_pdf_path(basename);

        let result = self.convert_inner(basename, &source).await;
        if let Err(err) = tokio::fs::remove_file(&source).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %source.display(), error = %err, "failed to delete source PDF");
            }
        }
        if result.is_err() {
            if let Err(err) = self.cache.discard_staged(basename).await {
                tracing::warn!(basename, error = %err, "failed to discard staging area");
            }
        }
        result
    }

    async fn convert_inner(
        &self,
        basename: &str,
        source: &Path,
    ) -> Result<ConversionOutcome, AppError> {
        self.cache.clear(PaperSize::Letter).await?;
        self.cache.clear(PaperSize::Legal).await?;

        let info = {
            let source = source.to_path_buf();
            tokio::task::spawn_blocking(move || normalizer::inspect(&source))
                .await
                .map_err(|err| AppError::Internal(format!("inspect task panicked: {}", err)))?
                .map_err(|err| AppError::Conversion(err.to_string()))?
        };
        tracing::info!(
            basename,
            pages = info.page_count,
            original_size = %info.original_size(),
            "converting upload"
        );

        let (letter_pages, legal_pages) = tokio::try_join!(
            self.normalize_variant(basename, source.to_path_buf(), PaperSize::Letter),
            self.normalize_variant(basename, source.to_path_buf(), PaperSize::Legal),
        )?;
        if letter_pages != info.page_count || legal_pages != info.page_count {
            return Err(AppError::Conversion(
                "normalized page count diverged from source".to_string(),
            ));
        }

        tokio::try_join!(
            self.rasterize_variant(basename, PaperSize::Letter),
            self.rasterize_variant(basename, PaperSize::Legal),
        )?;

        let letter = self.cache.publish_staged(PaperSize::Letter, basename).await?;
        let legal = self.cache.publish_staged(PaperSize::Legal, basename).await?;

        let letter_urls = letter
            .iter()
            .map(|p| self.cache.page_url(PaperSize::Letter, &p.file_name))
            .collect();
        let legal_urls = legal
            .iter()
            .map(|p| self.cache.page_url(PaperSize::Legal, &p.file_name))
            .collect();

        Ok(ConversionOutcome {
            letter_urls,
            legal_urls,
            total_pages: info.page_count,
            original_size: info.original_size(),
        })
    }

    async fn normalize_variant(
        &self,
        basename: &str,
        source: PathBuf,
        paper: PaperSize,
    ) -> Result<u32, AppError> {
        let output = self.cache.normalized_pdf_path(paper, basename);
        tokio::task::spawn_blocking(move || normalizer::normalize_to_paper(&source, &output, paper))
            .await
            .map_err(|err| AppError::Internal(format!("normalize task panicked: {}", err)))?
            .map_err(|err| AppError::Conversion(format!("{} normalization failed: {}", paper, err)))
    }

    async fn rasterize_variant(&self, basename: &str, paper: PaperSize) -> Result<(), AppError> {
        let pdf = self.cache.normalized_pdf_path(paper, basename);
        let staging = self.cache.staging_dir(paper, basename).await?;
        self.rasterizer
            .render_pages(&pdf, &staging, basename)
            .await
            .map_err(|err| AppError::Conversion(format!("{} rasterization failed: {}", paper, err)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printpoint_cache::LocalPageCache;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    fn fake_engine(dir: &std::path::Path) -> String {
        // Stand-in engine: emits a fixed pair of dash-numbered outputs,
        // enough to drive the rename and publish path.
        let script = dir.join("fake_engine.sh");
        std::fs::write(
            &script,
            b"#!/bin/sh\n\
              prefix=\"$5\"\n\
              printf 'fake' > \"${prefix}-1.png\"\n\
              printf 'fake' > \"${prefix}-2.png\"\n",
        )
        .unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        use std::os::unix::fs::PermissionsExt;
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();
        script.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_convert_publishes_both_partitions_and_deletes_source() {
        let dir = tempdir().unwrap();
        let cache = Arc::new(
            LocalPageCache::new(dir.path().join("cache"), "/previews".to_string())
                .await
                .unwrap(),
        );
        let engine = fake_engine(dir.path());
        let converter = Converter::new(cache.clone(), Rasterizer::new(engine, 72));

        let source = cache.incoming_pdf_path("doc");
        crate::normalizer::tests::build_pdf(&source, &[(612, 792), (612, 792)]);

        let outcome = converter.convert("doc").await.unwrap();
        assert_eq!(outcome.total_pages, 2);
        assert_eq!(outcome.original_size, PaperSize::Letter);
        assert_eq!(
            outcome.letter_urls,
            vec!["/previews/letter/doc_1.png", "/previews/letter/doc_2.png"]
        );
        assert_eq!(outcome.legal_urls.len(), 2);
        assert!(!source.exists());

        let pages: BTreeSet<u32> = [1, 2].into_iter().collect();
        for paper in PaperSize::ALL {
            let cached = cache.lookup(paper, "doc", &pages).await.unwrap();
            assert_eq!(cached.len(), 2);
        }

        cache.invalidate("doc").await.unwrap();
        for paper in PaperSize::ALL {
            assert!(cache.lookup(paper, "doc", &pages).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_convert_failure_deletes_source_and_staging() {
        let dir = tempdir().unwrap();
        let cache = Arc::new(
            LocalPageCache::new(dir.path().join("cache"), "/previews".to_string())
                .await
                .unwrap(),
        );
        let converter = Converter::new(cache.clone(), Rasterizer::new("/nonexistent/engine", 72));

        let source = cache.incoming_pdf_path("doc");
        crate::normalizer::tests::build_pdf(&source, &[(612, 792)]);

        let err = converter.convert("doc").await.unwrap_err();
        assert!(matches!(err, AppError::Conversion(_)));
        assert!(!source.exists());

        let pages: BTreeSet<u32> = [1].into_iter().collect();
        for paper in PaperSize::ALL {
            assert!(cache.lookup(paper, "doc", &pages).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_convert_rejects_bad_basename() {
        let dir = tempdir().unwrap();
        let cache = Arc::new(
            LocalPageCache::new(dir.path().join("cache"), "/previews".to_string())
                .await
                .unwrap(),
        );
        let converter = Converter::new(cache, Rasterizer::new("unused", 72));
        let err = converter.convert("../escape").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
