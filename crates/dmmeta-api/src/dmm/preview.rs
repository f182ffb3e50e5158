//! Sample movie resolution.
//!
//! The detail page only links to player pages through `onclick` handlers.
//! A standard sample takes three requests (player page, embedded iframe,
//! bitrate list in the iframe's script); a VR sample takes two (player page
//! with a `sampleUrl` literal). Each trigger walks the [`Hop`] states until
//! it is `Resolved` or `Abandoned`.

use std::sync::LazyLock;

use dmmeta_core::MetadataRecord;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use super::absolute_url;
use super::types::{Bitrate, PlayerArgs};
use crate::fetch::{FetchedPage, PageFetcher};

static SEL_TRIGGER: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("#detail-sample-movie > div > a, #detail-sample-vr-movie > div > a").unwrap()
});
static SEL_IFRAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("iframe[src]").unwrap());

/// Path between the first and last slash of an `onclick` handler.
static RE_ONCLICK_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/(.+)/").unwrap());
static RE_PLAYER_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"const args = (\{.+});").unwrap());
static RE_VR_SAMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"var sampleUrl = "(.+?)";"#).unwrap());

const VR_CONTAINER_ID: &str = "detail-sample-vr-movie";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Standard,
    Vr,
}

/// A sample-movie link found on a detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTrigger {
    pub kind: PreviewKind,
    /// Player page, `None` if the `onclick` handler carried no path.
    pub player_url: Option<Url>,
}

/// Why a trigger produced no URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Abandon {
    NoPlayerUrl,
    PlayerFetchFailed,
    NoEmbed,
    EmbedFetchFailed,
    NoPayload,
    NoBitrates,
    EmptySource,
}

/// Resolution state of one trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum Hop {
    Idle(PreviewTrigger),
    TriggerFound { kind: PreviewKind, url: Url },
    SecondaryFetched { kind: PreviewKind, page: FetchedPage },
    /// Standard samples only: the iframe page and the player page holding it.
    EmbedFetched { player_url: Url, page: FetchedPage },
    PayloadParsed { base: Url, src: String },
    Resolved(String),
    Abandoned(Abandon),
}

impl Hop {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Hop::Resolved(_) | Hop::Abandoned(_))
    }
}

/// Collect sample-movie triggers in document order.
pub fn find_triggers(doc: &Html, page_url: &Url) -> Vec<PreviewTrigger> {
    doc.select(&SEL_TRIGGER)
        .map(|anchor| {
            let in_vr_block = anchor
                .ancestors()
                .filter_map(scraper::ElementRef::wrap)
                .any(|el| el.value().id() == Some(VR_CONTAINER_ID));
            let kind = if in_vr_block {
                PreviewKind::Vr
            } else {
                PreviewKind::Standard
            };
            let player_url = anchor
                .value()
                .attr("onclick")
                .and_then(|onclick| RE_ONCLICK_PATH.find(onclick))
                .and_then(|m| page_url.join(m.as_str()).ok());
            PreviewTrigger { kind, player_url }
        })
        .collect()
}

/// Pick the highest bitrate. Ties go to the later entry.
pub fn select_highest_bitrate(mut bitrates: Vec<Bitrate>) -> Option<Bitrate> {
    bitrates.sort_by_key(|b| b.bitrate);
    bitrates.pop()
}

/// First iframe source in a player page, resolved against it.
fn find_embed(page: &FetchedPage) -> Option<Url> {
    let doc = Html::parse_document(&page.body);
    doc.select(&SEL_IFRAME)
        .find_map(|el| el.value().attr("src"))
        .filter(|src| !src.trim().is_empty())
        .and_then(|src| page.url.join(src.trim()).ok())
}

fn parse_player_args(body: &str) -> Option<PlayerArgs> {
    let caps = RE_PLAYER_ARGS.captures(body)?;
    match serde_json::from_str::<PlayerArgs>(&caps[1]) {
        Ok(args) => Some(args),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unparsable player args");
            None
        }
    }
}

/// Follows preview triggers through a cloned fetch context.
pub struct PreviewResolver<F> {
    fetcher: F,
}

impl<F: PageFetcher> PreviewResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Resolve every trigger in order; the last resolved URL wins.
    /// Abandoned triggers leave `preview_video_url` untouched.
    pub async fn apply(&self, triggers: Vec<PreviewTrigger>, record: &mut MetadataRecord) {
        for trigger in triggers {
            let kind = trigger.kind;
            match self.resolve(trigger).await {
                Hop::Resolved(url) => {
                    tracing::debug!(?kind, %url, "Resolved preview video");
                    record.preview_video_url = url;
                }
                Hop::Abandoned(reason) => {
                    tracing::debug!(?kind, ?reason, "Preview trigger abandoned");
                }
                _ => {}
            }
        }
    }

    /// Drive one trigger to a terminal state.
    pub async fn resolve(&self, trigger: PreviewTrigger) -> Hop {
        let mut hop = Hop::Idle(trigger);
        while !hop.is_terminal() {
            hop = self.step(hop).await;
        }
        hop
    }

    async fn step(&self, hop: Hop) -> Hop {
        match hop {
            Hop::Idle(trigger) => match trigger.player_url {
                Some(url) => Hop::TriggerFound {
                    kind: trigger.kind,
                    url,
                },
                None => Hop::Abandoned(Abandon::NoPlayerUrl),
            },

            Hop::TriggerFound { kind, url } => match self.fetcher.fetch(&url).await {
                Ok(page) => Hop::SecondaryFetched { kind, page },
                Err(e) => {
                    tracing::debug!(%url, error = %e, "Player page fetch failed");
                    Hop::Abandoned(Abandon::PlayerFetchFailed)
                }
            },

            Hop::SecondaryFetched {
                kind: PreviewKind::Standard,
                page,
            } => {
                let Some(embed) = find_embed(&page) else {
                    return Hop::Abandoned(Abandon::NoEmbed);
                };
                match self.fetcher.fetch(&embed).await {
                    Ok(embedded) => Hop::EmbedFetched {
                        player_url: page.url,
                        page: embedded,
                    },
                    Err(e) => {
                        tracing::debug!(url = %embed, error = %e, "Embedded player fetch failed");
                        Hop::Abandoned(Abandon::EmbedFetchFailed)
                    }
                }
            }

            Hop::SecondaryFetched {
                kind: PreviewKind::Vr,
                page,
            } => match RE_VR_SAMPLE.captures(&page.body) {
                Some(caps) => Hop::PayloadParsed {
                    base: page.url,
                    src: caps[1].to_string(),
                },
                None => Hop::Abandoned(Abandon::NoPayload),
            },

            Hop::EmbedFetched { player_url, page } => {
                let Some(args) = parse_player_args(&page.body) else {
                    return Hop::Abandoned(Abandon::NoPayload);
                };
                match select_highest_bitrate(args.bitrates) {
                    Some(best) => Hop::PayloadParsed {
                        base: player_url,
                        src: best.src,
                    },
                    None => Hop::Abandoned(Abandon::NoBitrates),
                }
            }

            Hop::PayloadParsed { base, src } => {
                let url = absolute_url(&base, &src);
                if url.is_empty() {
                    Hop::Abandoned(Abandon::EmptySource)
                } else {
                    Hop::Resolved(url)
                }
            }

            terminal @ (Hop::Resolved(_) | Hop::Abandoned(_)) => terminal,
        }
    }
}
