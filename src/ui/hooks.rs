/// Hooks binding components to the query cache
///
/// Every spawned task checks a cancellation flag before touching component
/// state, so a fetch that outlives its component only fills the cache.

use std::cell::Cell;
use std::rc::Rc;

use log::warn;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::analysis::AnalysisResult;
use crate::bridge;
use crate::query::QueryClient;
use crate::settings::Settings;
use crate::video::resolve_video_id;

#[derive(Clone, PartialEq)]
pub enum VideoTarget {
    Resolving,
    Ready(String),
    NotAVideo,
}

impl VideoTarget {
    pub fn id(&self) -> Option<String> {
        match self {
            VideoTarget::Ready(id) => Some(id.clone()),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq)]
pub enum QueryState<T> {
    /// No identifier yet; nothing was requested
    Disabled,
    Loading,
    Ready(T),
    Failed(String),
}

pub struct AnalysisQuery {
    pub state: QueryState<Rc<AnalysisResult>>,
    pub refetch: Callback<()>,
}

pub struct SettingsMutation {
    pub save: Callback<Settings>,
    pub error: Option<String>,
}

/// Flag that flips to true when the component unmounts
#[hook]
fn use_unmounted() -> Rc<Cell<bool>> {
    let flag = use_memo((), |_| Cell::new(false));
    {
        let flag = flag.clone();
        use_effect_with((), move |_| move || flag.set(true));
    }
    flag
}

/// Video id of the active tab, resolved once on mount
#[hook]
pub fn use_video_target() -> VideoTarget {
    let target = use_state(|| VideoTarget::Resolving);
    let unmounted = use_unmounted();

    {
        let target = target.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let location = bridge::active_tab_location().await;
                if unmounted.get() {
                    return;
                }
                match resolve_video_id(&location) {
                    Ok(id) => target.set(VideoTarget::Ready(id)),
                    Err(e) => {
                        warn!("{}", e);
                        target.set(VideoTarget::NotAVideo);
                    }
                }
            });
            || ()
        });
    }

    (*target).clone()
}

#[hook]
pub fn use_analysis(client: &QueryClient, video_id: Option<String>) -> AnalysisQuery {
    let state = use_state(|| QueryState::Disabled);
    let generation = use_state(|| 0u32);

    {
        let state = state.clone();
        use_effect_with(
            (client.clone(), video_id.clone(), *generation),
            move |(client, video_id, _)| {
                let cancelled = Rc::new(Cell::new(false));

                match video_id.clone() {
                    None => state.set(QueryState::Disabled),
                    Some(video_id) => {
                        state.set(QueryState::Loading);
                        let client = client.clone();
                        let cancelled = cancelled.clone();
                        spawn_local(async move {
                            let result = client.get_analysis(&video_id).await;
                            if cancelled.get() {
                                return;
                            }
                            state.set(match result {
                                Ok(data) => QueryState::Ready(data),
                                Err(e) => QueryState::Failed(e.to_string()),
                            });
                        });
                    }
                }

                move || cancelled.set(true)
            },
        );
    }

    let refetch = {
        let client = client.clone();
        let generation = generation.clone();
        Callback::from(move |_: ()| {
            if let Some(id) = &video_id {
                client.invalidate_analysis(id);
            }
            generation.set(*generation + 1);
        })
    };

    AnalysisQuery {
        state: (*state).clone(),
        refetch,
    }
}

/// Current settings; the defaults until the stored value arrives
#[hook]
pub fn use_settings(client: &QueryClient) -> Settings {
    let settings = use_state_eq({
        let client = client.clone();
        move || client.settings_snapshot()
    });

    {
        let settings = settings.clone();
        use_effect_with(client.clone(), move |client| {
            let cancelled = Rc::new(Cell::new(false));

            let subscription = {
                let settings = settings.clone();
                client.subscribe_settings(move |latest| settings.set(latest.clone()))
            };

            {
                let client = client.clone();
                let cancelled = cancelled.clone();
                spawn_local(async move {
                    let latest = client.get_settings().await;
                    if !cancelled.get() {
                        settings.set(latest);
                    }
                });
            }

            move || {
                cancelled.set(true);
                drop(subscription);
            }
        });
    }

    (*settings).clone()
}

/// Whole-object settings writes. Callers pass the complete new value.
#[hook]
pub fn use_update_settings(client: &QueryClient) -> SettingsMutation {
    let error = use_state(|| None::<String>);
    let unmounted = use_unmounted();

    let save = {
        let client = client.clone();
        let error = error.clone();
        Callback::from(move |settings: Settings| {
            let client = client.clone();
            let error = error.clone();
            let unmounted = unmounted.clone();
            spawn_local(async move {
                let result = client.update_settings(settings).await;
                if unmounted.get() {
                    return;
                }
                match result {
                    Ok(_) => error.set(None),
                    Err(e) => error.set(Some(e.to_string())),
                }
            });
        })
    };

    SettingsMutation {
        save,
        error: (*error).clone(),
    }
}
