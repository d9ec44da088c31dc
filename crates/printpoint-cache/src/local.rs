use crate::traits::{
    parse_page_index, validate_basename, CacheError, CacheResult, CachedPage, PageCache,
};
use async_trait::async_trait;
use printpoint_core::models::PaperSize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem page cache.
///
/// Layout under the root:
/// `letter/` and `legal/` partitions of rendered pages,
/// `pdf/` normalized-PDF side files,
/// `incoming/` transient source uploads,
/// `staging/{basename}/{partition}/` rasterizer output awaiting publish.
#[derive(Clone)]
pub struct LocalPageCache {
    root: PathBuf,
    base_url: String,
}

impl LocalPageCache {
    /// Create the cache, ensuring all fixed directories exist.
    pub async fn new(root: impl Into<PathBuf>, base_url: String) -> CacheResult<Self> {
        let root = root.into();
        for dir in [
            root.join(PaperSize::Letter.as_str()),
            root.join(PaperSize::Legal.as_str()),
            root.join("pdf"),
            root.join("incoming"),
            root.join("staging"),
        ] {
            fs::create_dir_all(&dir).await?;
        }
        Ok(LocalPageCache { root, base_url })
    }

    fn partition_dir(&self, paper: PaperSize) -> PathBuf {
        self.root.join(paper.as_str())
    }

    fn staging_root(&self, basename: &str) -> PathBuf {
        self.root.join("staging").join(basename)
    }

    /// Delete every file in `dir` whose name starts with `prefix`,
    /// swallowing individual failures.
    async fn remove_prefixed(&self, dir: &Path, prefix: &str) -> CacheResult<u64> {
        let mut removed = 0u64;
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(_) => return Ok(0),
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(prefix) {
                if let Err(e) = fs::remove_file(entry.path()).await {
                    tracing::warn!(path = %entry.path().display(), error = %e, "Failed to remove cached file");
                } else {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl PageCache for LocalPageCache {
    async fn clear(&self, paper: PaperSize) -> CacheResult<()> {
        let dir = self.partition_dir(paper);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(_) => return Ok(()),
        };
        let mut removed = 0u64;
        while let Ok(Some(entry)) = entries.next_entry().await {
            if let Err(e) = fs::remove_file(entry.path()).await {
                tracing::warn!(path = %entry.path().display(), error = %e, "Failed to clear cached file");
            } else {
                removed += 1;
            }
        }
        tracing::info!(partition = %paper, removed, "Cleared cache partition");
        Ok(())
    }

    async fn invalidate(&self, basename: &str) -> CacheResult<()> {
        validate_basename(basename)?;

        let mut removed = 0u64;
        for paper in PaperSize::ALL {
            let dir = self.partition_dir(paper);
            removed += self.remove_prefixed(&dir, &format!("{}_", basename)).await?;
            // Legacy artifacts from the older dash-separated naming.
            removed += self.remove_prefixed(&dir, &format!("{}-", basename)).await?;
        }

        for paper in PaperSize::ALL {
            let pdf = self.normalized_pdf_path(paper, basename);
            if fs::remove_file(&pdf).await.is_ok() {
                removed += 1;
            }
        }
        let incoming = self.incoming_pdf_path(basename);
        let _ = fs::remove_file(&incoming).await;
        let _ = fs::remove_dir_all(self.staging_root(basename)).await;

        tracing::info!(basename, removed, "Invalidated session artifacts");
        Ok(())
    }

    async fn list(&self, paper: PaperSize, basename: &str) -> CacheResult<Vec<CachedPage>> {
        validate_basename(basename)?;

        let dir = self.partition_dir(paper);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            // A missing partition is an empty result set, not an error.
            Err(_) => return Ok(Vec::new()),
        };

        let mut matched = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(index) = parse_page_index(name, basename) else {
                continue;
            };
            matched.push(CachedPage {
                page_index: index,
                file_name: name.to_string(),
                path: entry.path(),
            });
        }

        // Cost computation and multi-page display depend on this order.
        matched.sort_by_key(|p| p.page_index);
        Ok(matched)
    }

    async fn lookup(
        &self,
        paper: PaperSize,
        basename: &str,
        pages: &BTreeSet<u32>,
    ) -> CacheResult<Vec<CachedPage>> {
        let mut matched = self.list(paper, basename).await?;
        matched.retain(|p| pages.contains(&p.page_index));
        Ok(matched)
    }

    async fn publish_staged(
        &self,
        paper: PaperSize,
        basename: &str,
    ) -> CacheResult<Vec<CachedPage>> {
        validate_basename(basename)?;

        let staged = self.staging_root(basename).join(paper.as_str());
        let live = self.partition_dir(paper);
        let mut published = Vec::new();

        let mut entries = fs::read_dir(&staged).await.map_err(|e| {
            CacheError::PublishFailed(format!("staging dir {} unreadable: {}", staged.display(), e))
        })?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str().map(str::to_string) else {
                continue;
            };
            let Some(index) = parse_page_index(&name, basename) else {
                continue;
            };
            let target = live.join(&name);
            fs::rename(entry.path(), &target).await.map_err(|e| {
                CacheError::PublishFailed(format!(
                    "failed to publish {} into {}: {}",
                    name,
                    live.display(),
                    e
                ))
            })?;
            published.push(CachedPage {
                page_index: index,
                file_name: name,
                path: target,
            });
        }

        published.sort_by_key(|p| p.page_index);
        tracing::info!(
            partition = %paper,
            basename,
            pages = published.len(),
            "Published staged pages"
        );
        Ok(published)
    }

    async fn discard_staged(&self, basename: &str) -> CacheResult<()> {
        validate_basename(basename)?;
        let _ = fs::remove_dir_all(self.staging_root(basename)).await;
        Ok(())
    }

    async fn staging_dir(&self, paper: PaperSize, basename: &str) -> CacheResult<PathBuf> {
        validate_basename(basename)?;
        let dir = self.staging_root(basename).join(paper.as_str());
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    fn normalized_pdf_path(&self, paper: PaperSize, basename: &str) -> PathBuf {
        self.root
            .join("pdf")
            .join(format!("{}_{}.pdf", basename, paper.as_str()))
    }

    fn incoming_pdf_path(&self, basename: &str) -> PathBuf {
        self.root.join("incoming").join(format!("{}.pdf", basename))
    }

    fn page_url(&self, paper: PaperSize, file_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            paper.as_str(),
            file_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn cache(dir: &Path) -> LocalPageCache {
        LocalPageCache::new(dir, "/previews".to_string())
            .await
            .unwrap()
    }

    async fn put_page(cache: &LocalPageCache, paper: PaperSize, name: &str) {
        let path = cache.partition_dir(paper).join(name);
        fs::write(&path, b"png").await.unwrap();
    }

    fn all_pages() -> BTreeSet<u32> {
        (1..=999).collect()
    }

    #[tokio::test]
    async fn test_lookup_sorted_by_page_index() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path()).await;

        for name in ["doc_10.png", "doc_2.png", "doc_1.png"] {
            put_page(&cache, PaperSize::Letter, name).await;
        }

        let found = cache
            .lookup(PaperSize::Letter, "doc", &all_pages())
            .await
            .unwrap();
        let indices: Vec<u32> = found.iter().map(|p| p.page_index).collect();
        assert_eq!(indices, vec![1, 2, 10]);
    }

    #[tokio::test]
    async fn test_list_returns_every_page_for_basename() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path()).await;

        for name in ["doc_2.png", "doc_1.png", "other_1.png", "notes.txt"] {
            put_page(&cache, PaperSize::Letter, name).await;
        }

        let all = cache.list(PaperSize::Letter, "doc").await.unwrap();
        let indices: Vec<u32> = all.iter().map(|p| p.page_index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_lookup_filters_by_requested_pages_and_basename() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path()).await;

        for name in ["doc_1.png", "doc_2.png", "doc_3.png", "other_2.png"] {
            put_page(&cache, PaperSize::Legal, name).await;
        }

        let wanted: BTreeSet<u32> = [2, 3].into_iter().collect();
        let found = cache
            .lookup(PaperSize::Legal, "doc", &wanted)
            .await
            .unwrap();
        let names: Vec<&str> = found.iter().map(|p| p.file_name.as_str()).collect();
        assert_eq!(names, vec!["doc_2.png", "doc_3.png"]);
    }

    #[tokio::test]
    async fn test_lookup_missing_partition_is_empty() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path()).await;
        fs::remove_dir_all(cache.partition_dir(PaperSize::Letter))
            .await
            .unwrap();

        let found = cache
            .lookup(PaperSize::Letter, "doc", &all_pages())
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_removes_both_prefixes_and_side_files() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path()).await;

        put_page(&cache, PaperSize::Letter, "doc_1.png").await;
        put_page(&cache, PaperSize::Legal, "doc_1.png").await;
        put_page(&cache, PaperSize::Letter, "doc-2.png").await; // legacy naming
        put_page(&cache, PaperSize::Letter, "keep_1.png").await;
        fs::write(cache.normalized_pdf_path(PaperSize::Letter, "doc"), b"pdf")
            .await
            .unwrap();
        fs::write(cache.normalized_pdf_path(PaperSize::Legal, "doc"), b"pdf")
            .await
            .unwrap();

        cache.invalidate("doc").await.unwrap();

        let found = cache
            .lookup(PaperSize::Letter, "doc", &all_pages())
            .await
            .unwrap();
        assert!(found.is_empty());
        assert!(!cache.normalized_pdf_path(PaperSize::Letter, "doc").exists());
        assert!(!cache.normalized_pdf_path(PaperSize::Legal, "doc").exists());

        // Unrelated basenames are untouched.
        let kept = cache
            .lookup(PaperSize::Letter, "keep", &all_pages())
            .await
            .unwrap();
        assert_eq!(kept.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_empties_partition() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path()).await;

        put_page(&cache, PaperSize::Letter, "a_1.png").await;
        put_page(&cache, PaperSize::Letter, "b_1.png").await;
        put_page(&cache, PaperSize::Legal, "a_1.png").await;

        cache.clear(PaperSize::Letter).await.unwrap();

        assert!(cache
            .lookup(PaperSize::Letter, "a", &all_pages())
            .await
            .unwrap()
            .is_empty());
        // Other partition untouched.
        assert_eq!(
            cache
                .lookup(PaperSize::Legal, "a", &all_pages())
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_publish_staged_moves_pages_into_partition() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path()).await;

        let staged = cache.staging_dir(PaperSize::Letter, "doc").await.unwrap();
        fs::write(staged.join("doc_2.png"), b"png").await.unwrap();
        fs::write(staged.join("doc_1.png"), b"png").await.unwrap();

        let published = cache.publish_staged(PaperSize::Letter, "doc").await.unwrap();
        let indices: Vec<u32> = published.iter().map(|p| p.page_index).collect();
        assert_eq!(indices, vec![1, 2]);

        let found = cache
            .lookup(PaperSize::Letter, "doc", &all_pages())
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_basename_rejected() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path()).await;
        let result = cache
            .lookup(PaperSize::Letter, "../evil", &all_pages())
            .await;
        assert!(matches!(result, Err(CacheError::InvalidBasename(_))));
        assert!(matches!(
            cache.invalidate("a/b").await,
            Err(CacheError::InvalidBasename(_))
        ));
    }

    #[tokio::test]
    async fn test_page_url() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path()).await;
        assert_eq!(
            cache.page_url(PaperSize::Legal, "doc_1.png"),
            "/previews/legal/doc_1.png"
        );
    }
}
