/// Reusable UI components

use patternfly_yew::prelude::Spinner;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct LoadingProps {
    pub message: AttrValue,
}

#[function_component(Loading)]
pub fn loading(props: &LoadingProps) -> Html {
    html! {
        <div class="loading-text-center">
            <Spinner />
            <p class="loading-text">{&props.message}</p>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatCardProps {
    pub label: AttrValue,
    pub value: AttrValue,
    #[prop_or_default]
    pub alert: bool,
}

#[function_component(StatCard)]
pub fn stat_card(props: &StatCardProps) -> Html {
    html! {
        <div class="stat-card">
            <div class="stat-card-label">{&props.label}</div>
            <div class={classes!("stat-card-value", props.alert.then_some("stat-card-value-alert"))}>
                {&props.value}
            </div>
        </div>
    }
}

#[derive(PartialEq, Clone, Copy, Default)]
pub enum BarTone {
    #[default]
    Safe,
    Danger,
}

#[derive(Properties, PartialEq)]
pub struct StatBarProps {
    pub label: AttrValue,
    pub percent: u32, // 0-100
    #[prop_or_default]
    pub tone: BarTone,
}

#[function_component(StatBar)]
pub fn stat_bar(props: &StatBarProps) -> Html {
    let percent = props.percent.min(100);
    let color = match props.tone {
        BarTone::Safe => "#22c55e",
        BarTone::Danger => "#ef4444",
    };

    html! {
        <div class="stat-bar">
            <div class="stat-bar-header">
                <span class="stat-bar-label">{&props.label}</span>
                <span class="stat-bar-value">{format!("{}%", percent)}</span>
            </div>
            <div class="progress-container">
                <div style={format!("width: {}%; background-color: {}; height: 100%; border-radius: 9999px; transition: width 0.5s ease;", percent, color)}></div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ToggleSwitchProps {
    pub active: bool,
    pub ontoggle: Callback<()>,
}

#[function_component(ToggleSwitch)]
pub fn toggle_switch(props: &ToggleSwitchProps) -> Html {
    let onclick = props.ontoggle.reform(|_: MouseEvent| ());

    html! {
        <button
            class={classes!("toggle-switch", props.active.then_some("toggle-switch-on"))}
            role="switch"
            aria-checked={props.active.to_string()}
            {onclick}
        >
            <div class="toggle-switch-knob"></div>
        </button>
    }
}
