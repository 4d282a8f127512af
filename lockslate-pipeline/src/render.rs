//! Content rendering: decrypted bytes → viewer-consumable artifacts.
//!
//! Documents are rasterized to one PNG per page; videos are segmented
//! into an HLS VOD playlist. The production implementation shells out to
//! the same toolchain a deployment already needs (`soffice` for office
//! formats, `pdftoppm` for PDF rasterization, `ffmpeg` for HLS); tests
//! substitute a deterministic stub through the `Renderer` trait.

use crate::error::{PipelineError, PipelineResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Prefix `pdftoppm` is invoked with; rendered pages are
/// `page-<index>.png` (the index may be zero-padded).
const PAGE_PREFIX: &str = "page";

/// Rendering seam between the HTTP service and the external toolchain.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Rasterizes a document into `out_dir`, returning the rendered
    /// pages as `(source page index, artifact path)` in strictly
    /// ascending index order.
    ///
    /// Pages that fail to rasterize are simply absent from the result;
    /// an empty result is a render failure.
    async fn rasterize_document(
        &self,
        source: &Path,
        out_dir: &Path,
    ) -> PipelineResult<Vec<(u32, PathBuf)>>;

    /// Segments a video into `out_dir/playlist.m3u8` plus
    /// `segment_NNN.ts` files.
    async fn segment_video(
        &self,
        source: &Path,
        out_dir: &Path,
        segment_secs: u32,
    ) -> PipelineResult<()>;
}

/// Production renderer backed by external commands.
pub struct CommandRenderer;

#[async_trait]
impl Renderer for CommandRenderer {
    async fn rasterize_document(
        &self,
        source: &Path,
        out_dir: &Path,
    ) -> PipelineResult<Vec<(u32, PathBuf)>> {
        let pdf = if needs_pdf_conversion(source) {
            convert_to_pdf(source, out_dir).await?
        } else {
            source.to_path_buf()
        };

        let status = Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg("150")
            .arg(&pdf)
            .arg(out_dir.join(PAGE_PREFIX))
            .status()
            .await
            .map_err(|e| PipelineError::Render(format!("pdftoppm failed to start: {e}")))?;
        if !status.success() {
            return Err(PipelineError::Render(format!("pdftoppm exited with {status}")));
        }

        let pages = collect_rendered_pages(out_dir).await?;
        if pages.is_empty() {
            return Err(PipelineError::Render("document produced no pages".into()));
        }
        Ok(pages)
    }

    async fn segment_video(
        &self,
        source: &Path,
        out_dir: &Path,
        segment_secs: u32,
    ) -> PipelineResult<()> {
        let playlist = out_dir.join("playlist.m3u8");
        let status = Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(source)
            .arg("-hls_time")
            .arg(segment_secs.to_string())
            .arg("-hls_playlist_type")
            .arg("vod")
            .arg("-hls_segment_filename")
            .arg(out_dir.join("segment_%03d.ts"))
            .arg(&playlist)
            .status()
            .await
            .map_err(|e| PipelineError::Render(format!("ffmpeg failed to start: {e}")))?;
        if !status.success() {
            return Err(PipelineError::Render(format!("ffmpeg exited with {status}")));
        }
        if !playlist.exists() {
            return Err(PipelineError::Render("ffmpeg produced no playlist".into()));
        }
        Ok(())
    }
}

/// Office formats go through LibreOffice before rasterization.
fn needs_pdf_conversion(source: &Path) -> bool {
    matches!(
        source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("doc" | "docx" | "ppt" | "pptx")
    )
}

async fn convert_to_pdf(source: &Path, out_dir: &Path) -> PipelineResult<PathBuf> {
    let status = Command::new("soffice")
        .arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg(source)
        .arg("--outdir")
        .arg(out_dir)
        .status()
        .await
        .map_err(|e| PipelineError::Render(format!("soffice failed to start: {e}")))?;
    if !status.success() {
        return Err(PipelineError::Render(format!("soffice exited with {status}")));
    }

    let stem = source
        .file_stem()
        .ok_or_else(|| PipelineError::Render("source file has no stem".into()))?;
    let pdf = out_dir.join(stem).with_extension("pdf");
    if !pdf.exists() {
        return Err(PipelineError::Render("soffice produced no PDF".into()));
    }
    Ok(pdf)
}

/// Scans `out_dir` for rendered `page-<n>.png` files, sorted by page
/// index. Gaps in the index sequence are preserved as-is.
pub async fn collect_rendered_pages(out_dir: &Path) -> PipelineResult<Vec<(u32, PathBuf)>> {
    let mut pages = Vec::new();
    let mut entries = tokio::fs::read_dir(out_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(index) = page_index_from_filename(name) {
            pages.push((index, entry.path()));
        }
    }
    pages.sort_by_key(|(index, _)| *index);
    Ok(pages)
}

/// Parses the page index out of a rendered artifact name
/// (`page-3.png`, `page-03.png`, ...).
pub fn page_index_from_filename(name: &str) -> Option<u32> {
    name.strip_prefix(PAGE_PREFIX)?
        .strip_prefix('-')?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_padded_and_unpadded_page_indices() {
        assert_eq!(page_index_from_filename("page-1.png"), Some(1));
        assert_eq!(page_index_from_filename("page-03.png"), Some(3));
        assert_eq!(page_index_from_filename("page-120.png"), Some(120));
    }

    #[test]
    fn rejects_non_page_artifacts() {
        assert_eq!(page_index_from_filename("page-1.jpg"), None);
        assert_eq!(page_index_from_filename("source.pdf"), None);
        assert_eq!(page_index_from_filename("page-.png"), None);
        assert_eq!(page_index_from_filename("pages-1.png"), None);
    }

    #[test]
    fn office_formats_need_conversion() {
        assert!(needs_pdf_conversion(Path::new("/tmp/x/slides.PPTX")));
        assert!(needs_pdf_conversion(Path::new("notes.doc")));
        assert!(!needs_pdf_conversion(Path::new("lecture.pdf")));
        assert!(!needs_pdf_conversion(Path::new("clip.mp4")));
    }
}
