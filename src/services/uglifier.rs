// src/services/uglifier.rs - Ugly URL generation
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use log::debug;
use rand::{
    seq::{IndexedRandom, SliceRandom},
    Rng,
};
use url::form_urlencoded;

use crate::config::NamingPools;
use crate::models::UglinessLevel;
use crate::utils::random::{token_hex, token_urlsafe, RandomSource};

/// Decoy parameters in insertion order. Names are unique.
pub type TrackingParams = Vec<(String, String)>;

type TierFn = fn(&NamingPools, &mut dyn RandomSource, &mut TrackingParams);

/// Cumulative decoy tiers: every tier whose threshold is at or below the
/// level contributes, in this order.
const TIERS: [(u8, TierFn); 10] = [
    (1, utm_basics),
    (2, utm_campaign),
    (3, social_click_ids),
    (4, google_click_ids),
    (5, analytics_sessions),
    (6, microsoft_click_ids),
    (7, impression_ids),
    (8, affiliate_ids),
    (9, build_info),
    (10, maximum_chaos),
];

/// Levels below this get the fixed short path.
const DECOY_PATH_MIN_LEVEL: u8 = 3;
/// Fake file extension and percent-encoding chaos kick in here.
const CHAOS_MIN_LEVEL: u8 = 8;
const FRAGMENT_MIN_LEVEL: u8 = 6;
const CHAOS_PROBABILITY: f64 = 0.3;
const SHORT_PATH: &str = "/r";

/// Unpadded URL-safe base64 of the URL's UTF-8 bytes.
pub fn encode_original_url(url: &str) -> String {
    URL_SAFE_NO_PAD.encode(url.as_bytes())
}

fn add(params: &mut TrackingParams, name: &str, value: impl Into<String>) {
    params.push((name.to_string(), value.into()));
}

/// Uniform pick from a pool. Loaded pools are never empty.
fn pick<'a>(rng: &mut dyn RandomSource, pool: &'a [String]) -> &'a str {
    pool.choose(rng).map_or("", String::as_str)
}

fn ga_client_id(rng: &mut dyn RandomSource) -> String {
    let first = rng.random_range(100_000_000..=999_999_999);
    let second = rng.random_range(100_000_000..=999_999_999);
    format!("GA1.2.{}.{}", first, second)
}

fn utm_basics(pools: &NamingPools, rng: &mut dyn RandomSource, params: &mut TrackingParams) {
    add(params, "utm_source", pick(rng, &pools.utm_sources));
    add(params, "utm_medium", pick(rng, &pools.utm_mediums));
}

fn utm_campaign(pools: &NamingPools, rng: &mut dyn RandomSource, params: &mut TrackingParams) {
    let campaign = pick(rng, &pools.utm_campaigns);
    add(params, "utm_campaign", format!("{}_{}", campaign, token_hex(rng, 2)));
    add(params, "utm_content", pick(rng, &pools.utm_contents));
}

fn social_click_ids(pools: &NamingPools, rng: &mut dyn RandomSource, params: &mut TrackingParams) {
    add(params, "utm_term", pick(rng, &pools.utm_terms));
    add(params, "fbclid", format!("IwAR{}", token_urlsafe(rng, 16)));
}

fn google_click_ids(_: &NamingPools, rng: &mut dyn RandomSource, params: &mut TrackingParams) {
    add(params, "gclid", format!("Cj0KCQ{}", token_urlsafe(rng, 12)));
    add(params, "_ga", ga_client_id(rng));
}

fn analytics_sessions(_: &NamingPools, rng: &mut dyn RandomSource, params: &mut TrackingParams) {
    add(params, "_gid", ga_client_id(rng));
    add(params, "sessionid", token_hex(rng, 16));
}

fn microsoft_click_ids(_: &NamingPools, rng: &mut dyn RandomSource, params: &mut TrackingParams) {
    add(params, "msclkid", token_urlsafe(rng, 16));
    add(params, "tracking_token", format!("TRK_{}", token_urlsafe(rng, 12)));
}

fn impression_ids(_: &NamingPools, rng: &mut dyn RandomSource, params: &mut TrackingParams) {
    add(params, "impression_id", token_hex(rng, 8));
    add(params, "click_id", format!("CLK_{}", token_hex(rng, 8)));
    add(params, "visitor_id", token_hex(rng, 12));
}

fn affiliate_ids(_: &NamingPools, rng: &mut dyn RandomSource, params: &mut TrackingParams) {
    add(params, "referrer_id", format!("REF_{}", token_hex(rng, 8)));
    add(params, "affiliate_code", token_urlsafe(rng, 10));
    add(params, "partner_id", format!("P{}", rng.random_range(1000..=9999)));
}

fn build_info(_: &NamingPools, rng: &mut dyn RandomSource, params: &mut TrackingParams) {
    add(
        params,
        "timestamp",
        rng.random_range(1_700_000_000..=1_800_000_000).to_string(),
    );
    let major = rng.random_range(1..=5);
    let minor = rng.random_range(0..=9);
    let patch = rng.random_range(0..=99);
    add(params, "version", format!("v{}.{}.{}", major, minor, patch));
    add(params, "build", rng.random_range(1000..=9999).to_string());
}

fn maximum_chaos(_: &NamingPools, rng: &mut dyn RandomSource, params: &mut TrackingParams) {
    // HubSpot
    add(params, "_hsenc", token_urlsafe(rng, 20));
    add(params, "_hsmi", rng.random_range(100_000..=999_999).to_string());
    // Mailchimp
    add(params, "mc_cid", token_hex(rng, 16));
    add(params, "mc_eid", token_hex(rng, 16));
    add(params, "rb_clickid", token_urlsafe(rng, 12));
    // Wicked Reports
    add(params, "wickedid", token_hex(rng, 10));
}

/// Fake analytics parameters for the given level.
pub fn generate_tracking_params(
    level: UglinessLevel,
    pools: &NamingPools,
    rng: &mut dyn RandomSource,
) -> TrackingParams {
    let mut params = TrackingParams::new();
    for (threshold, tier) in TIERS {
        if level.get() >= threshold {
            tier(pools, rng, &mut params);
        }
    }
    params
}

/// Decoy path: `/r` for low levels, otherwise distinct tracking-ish segments
/// (more as the level grows) and a fake file extension at the top levels.
pub fn generate_meaningless_path(
    level: UglinessLevel,
    pools: &NamingPools,
    rng: &mut dyn RandomSource,
) -> String {
    let level = level.get();
    if level < DECOY_PATH_MIN_LEVEL {
        return SHORT_PATH.to_string();
    }

    let num_segments = (level as usize / 2 + 1).min(pools.decoy_paths.len());
    let segments: Vec<&str> = pools
        .decoy_paths
        .choose_multiple(rng, num_segments)
        .map(String::as_str)
        .collect();

    let mut path = format!("/{}", segments.join("/"));
    if level >= CHAOS_MIN_LEVEL {
        path.push_str(pick(rng, &pools.fake_extensions));
    }
    path
}

/// Percent-encodes lowercase letters and digits at random.
///
/// Existing `%XX` escapes are copied as-is, so the result always decodes to
/// the same name/value pairs as the input.
pub fn apply_encoding_chaos(query: &str, rng: &mut dyn RandomSource) -> String {
    let mut result = String::with_capacity(query.len() * 2);
    let mut chars = query.chars();

    while let Some(c) = chars.next() {
        if c == '%' {
            result.push(c);
            result.extend(chars.by_ref().take(2));
        } else if (c.is_ascii_lowercase() || c.is_ascii_digit()) && rng.random_bool(CHAOS_PROBABILITY) {
            result.push_str(&format!("%{:02X}", c as u32));
        } else {
            result.push(c);
        }
    }

    result
}

/// A fake `#fragment`, or an empty string below the fragment level.
pub fn generate_fragment_noise(level: UglinessLevel, rng: &mut dyn RandomSource) -> String {
    if level.get() < FRAGMENT_MIN_LEVEL {
        return String::new();
    }

    let fragment = match rng.random_range(0..5) {
        0 => format!("track_impression_{}", token_hex(rng, 4)),
        1 => format!("ref_{}", token_hex(rng, 6)),
        2 => format!("anchor_{}", rng.random_range(1000..=9999)),
        3 => format!("section_{}", token_urlsafe(rng, 6)),
        _ => format!("view_{}", token_hex(rng, 5)),
    };

    format!("#{}", fragment)
}

/// Turns clean URLs into ugly ones.
pub struct UglifierService {
    pools: Arc<NamingPools>,
}

impl UglifierService {
    pub fn new(pools: Arc<NamingPools>) -> Self {
        Self { pools }
    }

    /// Embeds `original_url` among decoys under `base_url`.
    ///
    /// Never fails and never validates: callers sanitize `original_url` first.
    /// Out-of-range levels are clamped.
    pub fn uglify(
        &self,
        original_url: &str,
        ugliness: i64,
        base_url: &str,
        rng: &mut dyn RandomSource,
    ) -> String {
        let level = UglinessLevel::clamped(ugliness);
        let encoded = encode_original_url(original_url);

        let mut params = generate_tracking_params(level, &self.pools, rng);

        // The carrier replaces a decoy of the same name, if any.
        let carrier = pick(rng, &self.pools.carrier_param_names).to_string();
        params.retain(|(name, _)| *name != carrier);
        params.push((carrier, encoded));

        params.shuffle(rng);

        let path = generate_meaningless_path(level, &self.pools, rng);

        let mut query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();

        if level.get() >= CHAOS_MIN_LEVEL {
            query = apply_encoding_chaos(&query, rng);
        }

        let fragment = generate_fragment_noise(level, rng);

        debug!(
            "Uglified URL at level {} with {} parameters",
            level.get(),
            params.len()
        );

        format!(
            "{}{}?{}{}",
            base_url.trim_end_matches('/'),
            path,
            query,
            fragment
        )
    }
}
