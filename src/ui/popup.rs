/// Popup UI for the comment guard extension

use std::rc::Rc;

use log::info;
use yew::prelude::*;

use crate::bridge;
use crate::config::{AppConfig, DataSourceKind};
use crate::query::{BrowserClock, QueryClient};
use crate::source::build_source;
use crate::storage::{SettingsStore, detect_backend};
use crate::ui::analysis::AnalysisTab;
use crate::ui::chat::ChatTab;
use crate::ui::filters::FiltersTab;
use crate::ui::hooks::use_video_target;

#[derive(Clone, Copy, PartialEq)]
enum ActiveTab {
    Analysis,
    Chat,
    Filters,
}

impl ActiveTab {
    const ALL: [ActiveTab; 3] = [ActiveTab::Analysis, ActiveTab::Chat, ActiveTab::Filters];

    fn label(self) -> &'static str {
        match self {
            ActiveTab::Analysis => "분석",
            ActiveTab::Chat => "채팅",
            ActiveTab::Filters => "필터",
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub config: AppConfig,
}

/// Wire the data source, settings store and cache together once per popup
pub fn create_query_client(config: &AppConfig) -> QueryClient {
    let has_host = bridge::hasExtensionStorage();
    let source = build_source(DataSourceKind::select(config, has_host), config);
    let store = Rc::new(SettingsStore::new(detect_backend()));

    info!("Query cache ready (stale after {:?})", config.stale_time);
    QueryClient::new(source, store, Rc::new(BrowserClock), config.stale_time)
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let client = use_memo(props.config.clone(), create_query_client);
    let client = (*client).clone();
    let active_tab = use_state(|| ActiveTab::Analysis);
    let video = use_video_target();

    let on_tab_click = {
        let active_tab = active_tab.clone();
        move |tab: ActiveTab| {
            let active_tab = active_tab.clone();
            Callback::from(move |_: MouseEvent| active_tab.set(tab))
        }
    };

    html! {
        <div class="popup-root">
            <h1 class="popup-title">{"Comment Guard"}</h1>

            <div class="pf-v5-c-tabs tabs-nav">
                <ul class="pf-v5-c-tabs__list">
                    {for ActiveTab::ALL.iter().map(|&tab| html! {
                        <li class={if *active_tab == tab { "pf-v5-c-tabs__item pf-m-current" } else { "pf-v5-c-tabs__item" }}>
                            <button class="pf-v5-c-tabs__link" onclick={on_tab_click(tab)}>
                                <span class="pf-v5-c-tabs__item-text">{tab.label()}</span>
                            </button>
                        </li>
                    })}
                </ul>
            </div>

            <div class="tab-pane-content">
                {match *active_tab {
                    ActiveTab::Analysis => html! { <AnalysisTab client={client.clone()} video={video.clone()} /> },
                    ActiveTab::Chat => html! { <ChatTab client={client.clone()} video={video.clone()} /> },
                    ActiveTab::Filters => html! { <FiltersTab client={client.clone()} /> },
                }}
            </div>

            <p class="footer-popup">
                {concat!("Comment Guard v", env!("CARGO_PKG_VERSION"))}
            </p>
        </div>
    }
}
