mod controller;
mod state;
mod ui;

use std::future::Future;
use std::sync::mpsc::{self as std_mpsc, Receiver, Sender};
use std::sync::Arc;

use derivative::Derivative;
use eframe::{egui, App};
use tokio::runtime::Runtime;

pub use controller::{Command, PageController};
pub use state::{NavTab, PageState};

use crate::persistence::KeyValueStore;
use crate::server::{fetch_file_logs, CardBackend, CardProperty, FileLogResult, FileName};

/// Results posted back from network tasks to the UI thread.
#[derive(Debug)]
pub enum PageEvent {
    Listing {
        generation: u64,
        files: Vec<FileName>,
    },
    ListingFailed {
        generation: u64,
    },
    FileLogs {
        generation: u64,
        results: Vec<FileLogResult>,
    },
    CardView {
        file: FileName,
        properties: Vec<CardProperty>,
    },
    UploadFinished {
        file: String,
        succeeded: bool,
    },
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct VCardManager<S> {
    controller: PageController<S>,
    #[derivative(Debug = "ignore")]
    backend: Arc<dyn CardBackend>,
    #[derivative(Debug = "ignore")]
    runtime: Runtime,
    #[derivative(Debug = "ignore")]
    events_tx: Sender<PageEvent>,
    #[derivative(Debug = "ignore")]
    events_rx: Receiver<PageEvent>,
    #[derivative(Debug = "ignore")]
    ctx: egui::Context,
    scroll_offset: f32,
    scroll_to_section: Option<NavTab>,
}

impl<S: KeyValueStore> VCardManager<S> {
    pub fn new(
        ctx: egui::Context,
        runtime: Runtime,
        controller: PageController<S>,
        backend: Arc<dyn CardBackend>,
    ) -> Self {
        let (events_tx, events_rx) = std_mpsc::channel();
        let mut app = Self {
            controller,
            backend,
            runtime,
            events_tx,
            events_rx,
            ctx,
            scroll_offset: 0.0,
            scroll_to_section: None,
        };

        tracing::info!("initializing page");
        let command = app.controller.initialize();
        app.execute(command);
        app
    }

    /// Runs a controller command. Network work goes to the runtime and
    /// reports back through the event channel.
    pub fn execute(&self, command: Command) {
        match command {
            Command::ListUploads { generation } => self.spawn(move |backend| async move {
                match backend.list_uploads().await {
                    Ok(files) => Some(PageEvent::Listing { generation, files }),
                    Err(e) => {
                        tracing::error!(error = %e, "failed to list upload directory");
                        Some(PageEvent::ListingFailed { generation })
                    }
                }
            }),
            Command::FetchFileLogs { generation, files } => {
                self.spawn(move |backend| async move {
                    let results = fetch_file_logs(backend.as_ref(), &files).await;
                    Some(PageEvent::FileLogs { generation, results })
                })
            }
            Command::FetchCard(file) => self.spawn(|backend| async move {
                match backend.card_view(&file).await {
                    Ok(properties) => Some(PageEvent::CardView { file, properties }),
                    Err(e) => {
                        tracing::error!(file = %file, error = %e, "failed to load card view");
                        None
                    }
                }
            }),
            Command::Upload(path) => self.spawn(|backend| async move {
                let file = path.display().to_string();
                let succeeded = match backend.upload(&path).await {
                    Ok(()) => {
                        tracing::info!(file = %file, "upload accepted");
                        true
                    }
                    Err(e) => {
                        tracing::error!(file = %file, error = %e, "upload failed");
                        false
                    }
                };
                Some(PageEvent::UploadFinished { file, succeeded })
            }),
            Command::OpenLink(href) => {
                if let Err(e) = open::that(&href) {
                    tracing::error!(%href, error = %e, "failed to open download link");
                }
            }
        }
    }

    fn spawn<F, Fut>(&self, task: F)
    where
        F: FnOnce(Arc<dyn CardBackend>) -> Fut,
        Fut: Future<Output = Option<PageEvent>> + Send + 'static,
    {
        let future = task(Arc::clone(&self.backend));
        let sender = self.events_tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            if let Some(event) = future.await {
                sender.send(event).unwrap_or_default();
                ctx.request_repaint();
            }
        });
    }

    pub fn handle_event(&mut self, event: PageEvent) {
        let follow_up = match event {
            PageEvent::Listing { generation, files } => {
                self.controller.listing_received(generation, files)
            }
            PageEvent::ListingFailed { generation } => {
                self.controller.listing_failed(generation);
                None
            }
            PageEvent::FileLogs {
                generation,
                results,
            } => {
                self.controller.file_logs_settled(generation, results);
                None
            }
            PageEvent::CardView { file, properties } => {
                self.controller.card_view_received(&file, &properties);
                None
            }
            PageEvent::UploadFinished { file, succeeded } => {
                tracing::debug!(file = %file, succeeded, "upload settled");
                self.controller.upload_finished(succeeded)
            }
        };

        if let Some(command) = follow_up {
            self.execute(command);
        }
    }

    pub fn update_state(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    pub fn persist_status(&mut self) {
        match self.controller.persist_status() {
            Ok(()) => tracing::debug!("status saved"),
            Err(e) => tracing::error!(error = %e, "failed to save status"),
        }
    }
}

impl<S: KeyValueStore> App for VCardManager<S> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state();
        self.render(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.persist_status();
    }
}
