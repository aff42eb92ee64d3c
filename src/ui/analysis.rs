/// Analysis report tab: headline counters and the comment status distribution

use patternfly_yew::prelude::*;
use yew::prelude::*;

use crate::query::QueryClient;
use crate::report::{Summary, group_thousands};
use crate::ui::components::{BarTone, Loading, StatBar, StatCard};
use crate::ui::hooks::{QueryState, VideoTarget, use_analysis};

#[derive(Properties, PartialEq)]
pub struct AnalysisTabProps {
    pub client: QueryClient,
    pub video: VideoTarget,
}

#[function_component(AnalysisTab)]
pub fn analysis_tab(props: &AnalysisTabProps) -> Html {
    let query = use_analysis(&props.client, props.video.id());

    let data = match &query.state {
        QueryState::Loading => return html! { <Loading message="분석 데이터 로딩 중..." /> },
        QueryState::Failed(err) => {
            return html! {
                <div class="tab-padding">
                    <Alert r#type={AlertType::Danger} title={"데이터를 불러오는데 실패했습니다."} inline={true}>
                        {err.clone()}
                    </Alert>
                    <Button onclick={query.refetch.reform(|_: MouseEvent| ())} variant={ButtonVariant::Secondary} block={true}>
                        {"다시 시도"}
                    </Button>
                </div>
            };
        }
        QueryState::Disabled => return html! { <div class="tab-padding">{"데이터가 없습니다."}</div> },
        QueryState::Ready(data) => data.clone(),
    };

    let summary = Summary::from_stats(&data.stats);
    let title = data.video_info.title.clone().unwrap_or_else(|| "Unknown Video".to_string());

    html! {
        <div class="tab-padding">
            <h2 class="section-title">{"분석 리포트"}</h2>

            <div class="stat-grid">
                <StatCard label="총 댓글 수" value={group_thousands(summary.total)} />
                <StatCard label="필터링됨" value={group_thousands(summary.filtered)} alert={true} />
            </div>

            <div class="stats-box">
                <h3 class="stats-title">{"댓글 상태 분포"}</h3>
                <StatBar label="정상 / 안전" percent={summary.safe_percent} tone={BarTone::Safe} />
                <StatBar label="차단 / 숨김" percent={summary.filtered_percent} tone={BarTone::Danger} />
            </div>

            <div class="footer-popup">
                {format!("현재 영상: {}", title)}
                <Button onclick={query.refetch.reform(|_: MouseEvent| ())} variant={ButtonVariant::Link}>
                    {"새로고침"}
                </Button>
            </div>
        </div>
    }
}
