/// Filters tab: intensity, detection modules, whitelist and blacklist

use patternfly_yew::prelude::*;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::query::QueryClient;
use crate::settings::{Intensity, ModuleKind, WordList};
use crate::ui::components::ToggleSwitch;
use crate::ui::hooks::{use_settings, use_update_settings};

#[derive(Properties, PartialEq)]
pub struct FiltersTabProps {
    pub client: QueryClient,
}

#[function_component(FiltersTab)]
pub fn filters_tab(props: &FiltersTabProps) -> Html {
    let settings = use_settings(&props.client);
    let mutation = use_update_settings(&props.client);

    // Every update spreads the current settings and changes one field
    let on_intensity = {
        let settings = settings.clone();
        let save = mutation.save.clone();
        Callback::from(move |level: u8| save.emit(settings.with_intensity(level)))
    };

    let on_toggle = {
        let settings = settings.clone();
        let save = mutation.save.clone();
        move |kind: ModuleKind| {
            let settings = settings.clone();
            let save = save.clone();
            Callback::from(move |_: ()| save.emit(settings.with_module_toggled(kind)))
        }
    };

    let on_white_list = {
        let settings = settings.clone();
        let save = mutation.save.clone();
        Callback::from(move |words: WordList| save.emit(settings.with_white_list(words)))
    };

    let on_black_list = {
        let settings = settings.clone();
        let save = mutation.save.clone();
        Callback::from(move |words: WordList| save.emit(settings.with_black_list(words)))
    };

    html! {
        <div class="tab-padding">
            if let Some(err) = mutation.error.clone() {
                <Alert r#type={AlertType::Danger} title={"설정을 저장하지 못했습니다."} inline={true}>
                    {err}
                </Alert>
            }

            <IntensitySection intensity={settings.intensity} onchange={on_intensity} />

            <section class="section-divider">
                <h3 class="section-title">{"모듈 설정"}</h3>
                {for ModuleKind::ALL.iter().map(|&kind| html! {
                    <div key={kind.key()} class="module-row">
                        <div class="module-text">
                            <div class="module-label">{kind.label()}</div>
                            <div class="module-desc">{kind.description()}</div>
                        </div>
                        <ToggleSwitch active={settings.modules.is_enabled(kind)} ontoggle={on_toggle(kind)} />
                    </div>
                })}
            </section>

            <WordListEditor
                title="화이트리스트"
                description="이 목록에 등록된 단어는 필터링 시스템에서 항상 안전한 단어로 인식됩니다. 욕설로 오해받을 수 있는 채널 밈, 애칭 등을 등록하여 오탐을 방지할 수 있습니다."
                words={settings.white_list.clone()}
                onchange={on_white_list}
                placeholder="단어 입력 후 엔터 또는 쉼표"
            />

            <WordListEditor
                title="블랙리스트"
                description="이 목록의 단어가 포함된 댓글은 필터링 강도와 관계없이 시스템이 가장 먼저, 그리고 확실하게 차단/숨김 조치를 취합니다."
                words={settings.black_list.clone()}
                onchange={on_black_list}
                placeholder="단어 입력 후 엔터 또는 쉼표"
            />
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct IntensitySectionProps {
    intensity: Intensity,
    onchange: Callback<u8>,
}

#[function_component(IntensitySection)]
fn intensity_section(props: &IntensitySectionProps) -> Html {
    let oninput = {
        let onchange = props.onchange.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(level) = e
                .target_dyn_into::<HtmlInputElement>()
                .and_then(|input| input.value().parse::<u8>().ok())
            {
                onchange.emit(level);
            }
        })
    };
    let intensity = props.intensity;

    html! {
        <section>
            <h3 class="section-title">{"강도 설정"}</h3>
            <input
                type="range"
                min={Intensity::MIN.to_string()}
                max={Intensity::MAX.to_string()}
                step="1"
                value={intensity.level().to_string()}
                class="intensity-slider"
                {oninput}
            />
            <div class="intensity-scale">
                <span>{"1단계"}</span>
                <span>{"5단계"}</span>
            </div>

            <div class="intensity-card">
                <span class="intensity-title">{format!("{}단계: {}", intensity.level(), intensity.title())}</span>
                <p class="intensity-desc">{intensity.description()}</p>
            </div>
        </section>
    }
}

#[derive(Properties, PartialEq)]
struct WordListEditorProps {
    title: AttrValue,
    description: AttrValue,
    words: WordList,
    onchange: Callback<WordList>,
    #[prop_or_default]
    placeholder: AttrValue,
}

#[function_component(WordListEditor)]
fn word_list_editor(props: &WordListEditorProps) -> Html {
    let input = use_state(String::new);
    let show_help = use_state(|| false);
    let input_ref = use_node_ref();

    let commit = {
        let input = input.clone();
        let words = props.words.clone();
        let onchange = props.onchange.clone();
        Callback::from(move |_: ()| {
            let mut next = words.clone();
            if next.insert(&input) {
                onchange.emit(next);
                input.set(String::new());
            }
        })
    };

    let onkeydown = {
        let commit = commit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" || e.key() == "," {
                e.prevent_default();
                commit.emit(());
            }
        })
    };

    let oninput = {
        let input = input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(el) = e.target_dyn_into::<HtmlInputElement>() {
                input.set(el.value());
            }
        })
    };

    let on_remove = {
        let words = props.words.clone();
        let onchange = props.onchange.clone();
        move |word: String| {
            let words = words.clone();
            let onchange = onchange.clone();
            Callback::from(move |e: MouseEvent| {
                e.stop_propagation();
                let mut next = words.clone();
                if next.remove(&word) {
                    onchange.emit(next);
                }
            })
        }
    };

    let on_clear = {
        let input = input.clone();
        let input_ref = input_ref.clone();
        let onchange = props.onchange.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            onchange.emit(WordList::new());
            input.set(String::new());
            if let Some(el) = input_ref.cast::<HtmlInputElement>() {
                let _ = el.focus();
            }
        })
    };

    let on_container_click = {
        let input_ref = input_ref.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(el) = input_ref.cast::<HtmlInputElement>() {
                let _ = el.focus();
            }
        })
    };

    let on_help = {
        let show_help = show_help.clone();
        Callback::from(move |_: MouseEvent| show_help.set(!*show_help))
    };

    let placeholder = if props.words.is_empty() {
        props.placeholder.clone()
    } else {
        AttrValue::default()
    };

    html! {
        <section class="word-list-section">
            <div class="word-list-header">
                <h3 class="section-title">{&props.title}</h3>
                <button class="help-button" onclick={on_help}>{"?"}</button>
                if *show_help {
                    <div class="help-tooltip">{&props.description}</div>
                }
            </div>

            <div class="word-list-box" onclick={on_container_click}>
                <div class="word-list-tags">
                    {for props.words.iter().map(|word| html! {
                        <span key={word.to_string()} class="word-tag">
                            {word}
                            <button class="word-tag-remove" onclick={on_remove(word.to_string())}>{"✕"}</button>
                        </span>
                    })}

                    <input
                        ref={input_ref}
                        class="word-list-input"
                        value={(*input).clone()}
                        {oninput}
                        {onkeydown}
                        onblur={commit.reform(|_: FocusEvent| ())}
                        placeholder={placeholder}
                    />
                </div>

                if !props.words.is_empty() {
                    <button class="word-list-clear" onclick={on_clear}>{"✕"}</button>
                }
            </div>
        </section>
    }
}

