use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use image::DynamicImage;
use image::imageops::{self, FilterType};
use tracing::info;

use crate::assets::cache::{JobId, OutputFileSet};
use crate::assets::decode::{encode_jpeg, open_oriented, probe_path};
use crate::assets::metadata::{MetadataBag, MetadataProvider, NoMetadata, read_or_empty};
use crate::foundation::core::{Size, round_half_up, scale_dim};
use crate::foundation::error::{FramemarkError, FramemarkResult};
use crate::handshake::bus::RendererBus;
use crate::handshake::protocol::{ShadowRequest, TextRequest};
use crate::job::options::{JobOptions, PreviewOptions};
use crate::job::progress::{PROGRESS_START, ProgressEvent, ProgressSink};
use crate::job::state::{JobState, Stage};
use crate::layout::content::content_layout;
use crate::layout::size::{SizeInfo, background_size, negotiate, scale_for_preview};
use crate::render::background::{BackgroundStyle, write_background};
use crate::render::composite::{composite_batch, composite_with_fallback, log_diagnostics};
use crate::render::fit::FitMode;
use crate::render::material::{MainLayer, Material, TextLayer};
use crate::render::plan::{plan_layers, scale_layers};
use crate::render::LayerSource;

/// Quality of the cached main photo in preview mode.
const PREVIEW_MAIN_QUALITY: u8 = 90;
/// Quality of the cached main photo for export.
const EXPORT_MAIN_QUALITY: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Fidelity {
    Export,
    Preview,
}

/// Removes cache files when dropped, whatever the outcome.
struct CacheCleanup(OutputFileSet);

impl Drop for CacheCleanup {
    fn drop(&mut self) {
        self.0.remove(true);
    }
}

async fn blocking<T, F>(f: F) -> FramemarkResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> FramemarkResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("blocking job stage panicked or was cancelled")?
}

/// One photo's watermark composition.
///
/// Stages run strictly in order; a job renders at most once.
pub struct CompositionJob {
    id: JobId,
    path: PathBuf,
    opts: JobOptions,
    bus: RendererBus,
    progress: ProgressSink,
    metadata: Arc<dyn MetadataProvider>,
    files: OutputFileSet,
    state: JobState,
    fidelity: Fidelity,
    size_info: Option<SizeInfo>,
    exif: MetadataBag,
    material: Material,
    content_height: u32,
    bg_brightness: Option<f64>,
}

impl CompositionJob {
    /// Create a job for the photo at `path`; `name` picks the output file name.
    pub fn new(path: impl Into<PathBuf>, name: &str, opts: JobOptions, bus: RendererBus) -> Self {
        let path = path.into();
        let id = JobId::generate(&path);
        let files = OutputFileSet::new(&id, &opts.cache_dir, &opts.output_dir, name);
        Self {
            id,
            path,
            opts,
            bus,
            progress: ProgressSink::default(),
            metadata: Arc::new(NoMetadata),
            files,
            state: JobState::Uninitialized,
            fidelity: Fidelity::Export,
            size_info: None,
            exif: MetadataBag::new(),
            material: Material::default(),
            content_height: 0,
            bg_brightness: None,
        }
    }

    /// Register the progress channel.
    pub fn with_progress(mut self, tx: tokio::sync::mpsc::UnboundedSender<ProgressEvent>) -> Self {
        self.progress = ProgressSink::new(tx);
        self
    }

    /// Replace the metadata provider (defaults to [`NoMetadata`]).
    pub fn with_metadata(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.metadata = provider;
        self
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn files(&self) -> &OutputFileSet {
        &self.files
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Working dimensions; fails before [`init`](Self::init).
    pub fn size_info(&self) -> FramemarkResult<SizeInfo> {
        self.size_info
            .ok_or_else(|| FramemarkError::not_initialized(format!("job {}", self.id)))
    }

    /// Previews report no progress; only exports emit the milestone stream.
    fn stage_done(&self, stage: Stage) {
        if self.fidelity == Fidelity::Preview {
            return;
        }
        if let Some(p) = stage.progress() {
            self.progress.emit(self.id.as_str(), p);
        }
    }

    /// Read the photo's oriented size and metadata. Idempotent.
    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn init(&mut self) -> FramemarkResult<()> {
        if self.state != JobState::Uninitialized {
            return Ok(());
        }
        let path = self.path.clone();
        let cache_dir = self.opts.cache_dir.clone();
        let provider = Arc::clone(&self.metadata);
        let (photo, exif) = blocking(move || {
            if !path.is_file() {
                return Err(FramemarkError::validation(format!(
                    "source photo not found: {}",
                    path.display()
                )));
            }
            std::fs::create_dir_all(&cache_dir)
                .with_context(|| format!("create cache dir '{}'", cache_dir.display()))?;
            let size = probe_path(&path)?;
            Ok((size, read_or_empty(provider.as_ref(), &path)))
        })
        .await?;

        let info = negotiate(photo, &self.opts.layout);
        info!(
            w = info.w,
            h = info.h,
            reset_w = info.reset_w,
            reset_h = info.reset_h,
            "initialized"
        );
        self.size_info = Some(info);
        self.exif = exif;
        self.state = JobState::Initialized;
        Ok(())
    }

    fn begin(&mut self) -> FramemarkResult<()> {
        if self.state.is_finished() {
            return Err(FramemarkError::validation(format!(
                "job {} has already rendered",
                self.id
            )));
        }
        if self.state == JobState::Rendering {
            return Err(FramemarkError::validation(format!(
                "job {} is already rendering",
                self.id
            )));
        }
        Ok(())
    }

    fn finish<T>(&mut self, result: FramemarkResult<T>) -> FramemarkResult<T> {
        self.state = if result.is_ok() {
            JobState::Done
        } else {
            JobState::Failed
        };
        result
    }

    /// Full-fidelity export. Returns the composite path.
    ///
    /// Cache files are removed after success and kept on failure.
    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn render(&mut self) -> FramemarkResult<PathBuf> {
        self.begin()?;
        self.fidelity = Fidelity::Export;
        self.progress.emit(self.id.as_str(), PROGRESS_START);

        let result = self.run_export().await;
        if let Err(err) = &result {
            tracing::error!(error = %err, "render failed");
        }
        let result = self.finish(result);
        if result.is_ok() {
            self.files.remove(true);
        }
        result
    }

    async fn run_export(&mut self) -> FramemarkResult<PathBuf> {
        info!("initializing");
        self.init().await?;
        self.state = JobState::Rendering;
        self.stage_done(Stage::Init);
        self.run_stages().await?;

        info!("compositing");
        let files = self.files.clone();
        let material = self.material.clone();
        let style = BackgroundStyle::from_options(&self.opts.layout, false);
        let quality = self.opts.layout.export_quality();
        blocking(move || {
            let layers = plan_layers(
                &material,
                LayerSource::Path(files.bg.clone()),
                LayerSource::Path(files.mask.clone()),
                FitMode::Conditional,
            );
            let img = composite_batch(material.bg, style.canvas_color(), &layers)
                .inspect_err(|_| log_diagnostics(material.bg, &layers))?;
            let bytes = encode_jpeg(&DynamicImage::ImageRgba8(img), quality)?;
            if let Some(dir) = files.composite.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("create output dir '{}'", dir.display()))?;
            }
            std::fs::write(&files.composite, bytes)
                .with_context(|| format!("write composite '{}'", files.composite.display()))?;
            Ok(())
        })
        .await?;
        self.stage_done(Stage::Composite);

        info!(path = %self.files.composite.display(), "composite written");
        Ok(self.files.composite.clone())
    }

    /// Reduced-size preview encoded as JPEG bytes. Cache files are always removed.
    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn render_preview(&mut self, opts: PreviewOptions) -> FramemarkResult<Vec<u8>> {
        self.begin()?;
        self.fidelity = Fidelity::Preview;
        let _cleanup = CacheCleanup(self.files.clone());

        let result = self.run_preview(opts).await;
        if let Err(err) = &result {
            tracing::error!(error = %err, "preview failed");
        }
        self.finish(result)
    }

    async fn run_preview(&mut self, opts: PreviewOptions) -> FramemarkResult<Vec<u8>> {
        let (max_size, quality) = opts.normalized();
        self.init().await?;
        self.state = JobState::Rendering;

        let (scaled, scale) = scale_for_preview(self.size_info()?, max_size);
        info!(scale, max_size, quality, "preview scale");
        self.size_info = Some(scaled);

        self.run_stages().await?;

        let material = self.material.clone();
        let files = self.files.clone();
        let style = BackgroundStyle::from_options(&self.opts.layout, true);
        blocking(move || {
            let bg = material.bg;
            let layers = plan_layers(
                &material,
                LayerSource::Path(files.bg.clone()),
                LayerSource::Path(files.mask.clone()),
                FitMode::Forced,
            );
            let scale = (f64::from(max_size) / f64::from(bg.max_side().max(1))).min(1.0);
            let out = Size::new(scale_dim(bg.width, scale), scale_dim(bg.height, scale));
            let layers = scale_layers(&layers, scale, out);
            let img = composite_with_fallback(out, style.canvas_color(), &layers)?;
            encode_jpeg(&DynamicImage::ImageRgba8(img), quality)
        })
        .await
    }

    async fn run_stages(&mut self) -> FramemarkResult<()> {
        info!("computing background size");
        self.layout_pass1()?;
        self.stage_done(Stage::LayoutPass1);

        info!("requesting text");
        self.fetch_text().await?;
        self.stage_done(Stage::TextFetch);

        info!("caching main photo");
        self.cache_main().await?;
        self.stage_done(Stage::MainCache);

        info!("computing content height");
        self.layout_pass2()?;
        self.stage_done(Stage::LayoutPass2);

        info!("rendering background");
        self.render_background().await?;
        self.stage_done(Stage::BackgroundRender);

        info!("requesting shadow mask");
        self.fetch_shadow().await?;
        self.stage_done(Stage::ShadowFetch);
        Ok(())
    }

    /// First background estimate from the photo height.
    pub fn layout_pass1(&mut self) -> FramemarkResult<Size> {
        let info = self.size_info()?;
        self.material.bg = background_size(&info, &self.opts.layout, info.h);
        Ok(self.material.bg)
    }

    /// Ask the renderer for text bitmaps sized against the current background.
    pub async fn fetch_text(&mut self) -> FramemarkResult<()> {
        self.size_info()?;
        let req = TextRequest {
            id: self.id.to_string(),
            exif: self.exif.clone(),
            bg_height: self.material.bg.height,
            options: self.opts.layout.clone(),
            fields: self.opts.fields.clone(),
            temps: self.opts.temps.clone(),
            logo_path: self.opts.logo.clone(),
        };
        let resp = self.bus.request_text(req).await?;
        self.material.text = resp
            .text_img_list
            .iter()
            .map(|t| -> FramemarkResult<TextLayer> {
                Ok(TextLayer {
                    source: LayerSource::encoded(t.bytes()?),
                    w: t.w,
                    h: f64::from(t.h),
                })
            })
            .collect::<FramemarkResult<Vec<_>>>()?;
        info!(count = self.material.text.len(), "text layers received");
        Ok(())
    }

    /// Write the orientation-corrected photo to the main cache file.
    pub async fn cache_main(&mut self) -> FramemarkResult<()> {
        let info = self.size_info()?;
        let src = self.path.clone();
        let dest = self.files.main.clone();
        let preview = self.fidelity == Fidelity::Preview;
        blocking(move || write_main(&src, &dest, info, preview)).await?;

        self.material.main = vec![MainLayer {
            source: LayerSource::Path(self.files.main.clone()),
            w: info.w,
            h: info.h,
            top: 0,
            left: 0,
        }];
        Ok(())
    }

    /// Content height and the main photo's vertical offset inside it.
    pub fn layout_pass2(&mut self) -> FramemarkResult<u32> {
        self.size_info()?;
        let Some(main_h) = self.material.main.first().map(|m| m.h) else {
            return Err(FramemarkError::not_initialized(format!(
                "job {}: main photo not cached",
                self.id
            )));
        };

        let layout = content_layout(
            self.material.bg.height,
            main_h,
            &self.material.text_heights(),
            &self.opts.layout,
        );
        self.material.main[0].top = i64::from(layout.content_top);
        if let (Some(pad), Some(last)) = (layout.bottom_text_padding, self.material.text.last_mut())
        {
            last.h += pad;
        }
        self.content_height = layout.content_height;
        Ok(layout.content_height)
    }

    /// Final background size, background cache file and main photo placement.
    pub async fn render_background(&mut self) -> FramemarkResult<()> {
        let info = self.size_info()?;
        if self.content_height == 0 || self.material.main.is_empty() {
            return Err(FramemarkError::not_initialized(format!(
                "job {}: content height not computed",
                self.id
            )));
        }
        let bg = background_size(&info, &self.opts.layout, self.content_height);
        self.material.bg = bg;

        let style =
            BackgroundStyle::from_options(&self.opts.layout, self.fidelity == Fidelity::Preview);
        let src = self.path.clone();
        let dest = self.files.bg.clone();
        let brightness = blocking(move || write_background(&src, bg, &style, &dest)).await?;
        self.bg_brightness = (!self.opts.layout.solid_bg).then_some(brightness);

        let slack = i64::from(bg.height) - i64::from(self.content_height);
        let main = &mut self.material.main[0];
        main.left = round_half_up((f64::from(bg.width) - f64::from(main.w)) / 2.0);
        main.top += round_half_up(slack as f64 / 2.0);
        Ok(())
    }

    /// Ask the renderer for the shadow mask and write it to the mask cache file.
    pub async fn fetch_shadow(&mut self) -> FramemarkResult<()> {
        self.size_info()?;
        let req = ShadowRequest {
            id: self.id.to_string(),
            material: self.material.snapshot(),
            options: self.opts.layout.clone(),
            bg_brightness: self.bg_brightness,
        };
        let resp = self.bus.request_shadow(req).await?;
        let bytes = resp.bytes()?;
        let dest = self.files.mask.clone();
        blocking(move || {
            std::fs::write(&dest, bytes)
                .with_context(|| format!("write mask '{}'", dest.display()))?;
            Ok(())
        })
        .await
    }
}

fn write_main(src: &Path, dest: &Path, info: SizeInfo, preview: bool) -> FramemarkResult<()> {
    let img = open_oriented(src)?;
    let (img, quality) = if preview && (img.width(), img.height()) != (info.w, info.h) {
        let resized = imageops::resize(&img, info.w, info.h, FilterType::Triangle);
        (DynamicImage::ImageRgba8(resized), PREVIEW_MAIN_QUALITY)
    } else if preview {
        (img, PREVIEW_MAIN_QUALITY)
    } else {
        (img, EXPORT_MAIN_QUALITY)
    };
    let bytes = encode_jpeg(&img, quality)?;
    std::fs::write(dest, bytes).with_context(|| format!("write main '{}'", dest.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/job/pipeline.rs"]
mod tests;
