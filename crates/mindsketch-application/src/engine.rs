//! Engine assembly.
//!
//! Builds the fully wired test flow out of the on-disk state: the API key
//! from secret.json, settings from config.toml, and the archive at its
//! default location. The embedding front end holds one `SketchEngine` and
//! drives everything through it.

use crate::test_flow::TestFlowUseCase;
use mindsketch_core::archive::ArchiveRepository;
use mindsketch_core::capture::{CameraDevice, CaptureSurface};
use mindsketch_core::config::{AppConfig, DEFAULT_ANALYSIS_MODEL};
use mindsketch_core::error::{Result, SketchError};
use mindsketch_core::gateway::ChatGateway;
use mindsketch_core::secret::SecretService;
use mindsketch_infrastructure::{ConfigService, JsonArchiveRepository, SecretServiceImpl};
use mindsketch_interaction::{CounselorSession, GeminiAnalysisAgent, GeminiChatAgent};
use std::sync::Arc;
use std::time::Duration;

/// The assembled MindSketch engine: configuration, the camera collaborator,
/// the test flow, and the chat gateway for counselor sessions.
pub struct SketchEngine {
    config: AppConfig,
    camera: Arc<dyn CameraDevice>,
    flow: TestFlowUseCase,
    chat_gateway: Arc<dyn ChatGateway>,
}

impl SketchEngine {
    /// Assembles the engine from the default on-disk locations.
    ///
    /// The camera device is supplied by the embedding platform; the engine
    /// ships no hardware backend.
    ///
    /// # Errors
    ///
    /// Returns `Credential` when the Gemini key is missing or blank, so the
    /// caller can route straight into key registration.
    pub async fn bootstrap(camera: Arc<dyn CameraDevice>) -> Result<Self> {
        let secrets = SecretServiceImpl::default_location()
            .map_err(|e| SketchError::config(format!("Failed to initialize SecretService: {e}")))?;
        let archive = JsonArchiveRepository::default_location()
            .await
            .map_err(|e| SketchError::config(format!("Failed to open the result archive: {e}")))?;
        Self::assemble(&ConfigService::new(), &secrets, Arc::new(archive), camera).await
    }

    /// Assembles the engine from explicit services.
    pub async fn assemble(
        config_service: &ConfigService,
        secret_service: &dyn SecretService,
        archive: Arc<dyn ArchiveRepository>,
        camera: Arc<dyn CameraDevice>,
    ) -> Result<Self> {
        let config = config_service.get_config();
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let analysis = GeminiAnalysisAgent::try_from_secrets(secret_service).await?;
        // config.toml overrides the model paired with the key in secret.json
        // only when it was set to something other than the stock default.
        let analysis = if config.analysis_model != DEFAULT_ANALYSIS_MODEL {
            analysis.with_model(config.analysis_model.clone())
        } else {
            analysis
        }
        .with_timeout(timeout);

        let chat = GeminiChatAgent::try_from_secrets(secret_service)
            .await?
            .with_model(config.chat_model.clone())
            .with_timeout(timeout);

        Ok(Self {
            flow: TestFlowUseCase::new(Arc::new(analysis), archive),
            chat_gateway: Arc::new(chat),
            camera,
            config,
        })
    }

    /// The loaded application settings.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The test flow driving capture, analysis, and the archive.
    pub fn flow(&self) -> &TestFlowUseCase {
        &self.flow
    }

    /// A fresh capture surface sized per configuration; one per stage.
    pub fn new_capture_surface(&self) -> CaptureSurface {
        CaptureSurface::new(
            self.config.canvas_width,
            self.config.canvas_height,
            self.camera.clone(),
        )
    }

    /// Opens a counselor session bound to the result on display.
    pub async fn open_counselor(&self) -> Result<CounselorSession> {
        self.flow.open_counselor(self.chat_gateway.clone()).await
    }
}
