/// Chat-style feed of analysed comments

use patternfly_yew::prelude::*;
use yew::prelude::*;

use crate::analysis::CommentSummary;
use crate::query::QueryClient;
use crate::report::{FeedEntry, avatar_initials};
use crate::settings::Settings;
use crate::ui::components::Loading;
use crate::ui::hooks::{QueryState, VideoTarget, use_analysis, use_settings};

#[derive(Properties, PartialEq)]
pub struct ChatTabProps {
    pub client: QueryClient,
    pub video: VideoTarget,
}

#[function_component(ChatTab)]
pub fn chat_tab(props: &ChatTabProps) -> Html {
    let query = use_analysis(&props.client, props.video.id());
    let settings = use_settings(&props.client);

    if props.video == VideoTarget::NotAVideo {
        return html! { <div class="tab-padding text-center muted">{"유튜브 영상 페이지가 아닙니다."}</div> };
    }

    match &query.state {
        QueryState::Loading | QueryState::Disabled => html! { <Loading message="분석 중입니다... 🛡️" /> },
        QueryState::Failed(_) => html! {
            <div class="tab-padding text-center">
                <p class="error-text">{"데이터를 불러오는데 실패했습니다."}</p>
                <Button onclick={query.refetch.reform(|_: MouseEvent| ())} variant={ButtonVariant::Secondary}>
                    {"다시 시도"}
                </Button>
            </div>
        },
        QueryState::Ready(data) => html! {
            <div class="chat-feed">
                {for data.comments.iter().enumerate().map(|(index, comment)| render_comment(index, comment, &settings))}
            </div>
        },
    }
}

fn render_comment(index: usize, comment: &CommentSummary, settings: &Settings) -> Html {
    let entry = FeedEntry::classify(comment, settings);
    let hidden = entry.is_hidden();

    html! {
        <div key={index} class={classes!("chat-row", hidden.then_some("chat-row-hidden"))}>
            <div class={classes!("chat-avatar", hidden.then_some("chat-avatar-hidden"))}>
                {avatar_initials(&comment.author)}
            </div>

            <div class="chat-body">
                <div class="chat-meta">
                    <span class="chat-author">{&comment.author}</span>
                    <span class="chat-time">{&comment.published_at}</span>
                </div>

                <p class={classes!("chat-text", hidden.then_some("chat-text-hidden"))}>
                    {entry.text().to_string()}
                </p>

                if !comment.violation_tags.is_empty() {
                    <div class="chat-tags">
                        {for comment.violation_tags.iter().map(|tag| html! {
                            <span key={tag.clone()} class="chat-tag">{tag}</span>
                        })}
                    </div>
                }
            </div>
        </div>
    }
}
