use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use tracing::{info, warn};

use crate::tree::{
    ClassId, NodeId, SavedBuild, TreeGraph, load_build, load_dataset,
};

mod allocation;
mod assets;
mod hit;
mod scene;
mod ui;
mod viewport;
mod visibility;

use allocation::AllocationState;
use assets::SpriteCache;
use scene::SceneRenderer;
use viewport::Viewport;

type LoadResult = Result<(TreeGraph, Option<SavedBuild>), String>;

pub struct PlannerApp {
    tree_path: PathBuf,
    assets_dir: Option<PathBuf>,
    build_path: Option<PathBuf>,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: TreeGraph,
    allocation: AllocationState,
    viewport: Viewport,
    viewport_ready: bool,
    sprites: SpriteCache,
    scene: SceneRenderer,
    search: String,
    search_revision: u64,
    search_match_cache: Option<SearchMatchCache>,
    hovered: Option<NodeId>,
    canvas_size: Vec2,
    build_path: Option<PathBuf>,
    save_feedback: Option<String>,
    reload_error: Option<String>,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<HashSet<NodeId>>,
}

impl ViewModel {
    fn new(
        graph: TreeGraph,
        saved: Option<SavedBuild>,
        assets_dir: Option<PathBuf>,
        build_path: Option<PathBuf>,
    ) -> Self {
        let mut allocation = AllocationState::new();
        if let Some(saved) = saved {
            let class = saved.class.as_deref().and_then(|name| {
                let class = ClassId::from_name(name);
                if class.is_none() {
                    warn!(class = name, "saved build names an unknown class");
                }
                class
            });
            allocation.set_selected_class(class);
            allocation.set_allocated_ids(&graph, saved.nodes);
        }

        Self {
            graph,
            allocation,
            viewport: Viewport::default(),
            viewport_ready: false,
            sprites: SpriteCache::new(assets_dir),
            scene: SceneRenderer::new(),
            search: String::new(),
            search_revision: 0,
            search_match_cache: None,
            hovered: None,
            canvas_size: Vec2::ZERO,
            build_path,
            save_feedback: None,
            reload_error: None,
        }
    }
}

impl PlannerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        tree_path: PathBuf,
        assets_dir: Option<PathBuf>,
        build_path: Option<PathBuf>,
    ) -> Self {
        let state = AppState::Loading {
            rx: Self::spawn_load(tree_path.clone(), build_path.clone()),
        };
        Self {
            tree_path,
            assets_dir,
            build_path,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(tree_path: PathBuf, build_path: Option<PathBuf>) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = (|| {
                let dataset = load_dataset(&tree_path)?;
                let graph = TreeGraph::build(&dataset);
                info!(
                    nodes = graph.nodes.len(),
                    connections = graph.connections.len(),
                    "tree dataset loaded"
                );
                let saved = build_path.as_deref().map(load_build).transpose()?;
                anyhow::Ok((graph, saved))
            })()
            .map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn state_for(
        result: LoadResult,
        assets_dir: &Option<PathBuf>,
        build_path: &Option<PathBuf>,
    ) -> AppState {
        match result {
            Ok((graph, saved)) => AppState::Ready(Box::new(ViewModel::new(
                graph,
                saved,
                assets_dir.clone(),
                build_path.clone(),
            ))),
            Err(error) => AppState::Error(error),
        }
    }
}

impl eframe::App for PlannerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition: Option<AppState> = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(Self::state_for(result, &self.assets_dir, &self.build_path));
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading passive tree data...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Tree data unavailable");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(AppState::Loading {
                            rx: Self::spawn_load(
                                self.tree_path.clone(),
                                self.build_path.clone(),
                            ),
                        });
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    // Full stop-and-rebuild: the new ViewModel replaces the
                    // graph and caches wholesale once the load lands.
                    self.reload_rx = Some(Self::spawn_load(
                        self.tree_path.clone(),
                        self.build_path.clone(),
                    ));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        // A failed reload keeps the current graph on screen.
                        Ok(Err(error)) => model.reload_error = Some(error),
                        Ok(ok) => {
                            transition =
                                Some(Self::state_for(ok, &self.assets_dir, &self.build_path));
                        }
                        Err(TryRecvError::Empty) => self.reload_rx = Some(rx),
                        Err(TryRecvError::Disconnected) => {
                            model.reload_error =
                                Some("background load worker disconnected".to_owned());
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
