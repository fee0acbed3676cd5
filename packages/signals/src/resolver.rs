//! Three-tier fallback resolution.
//!
//! One resolver serves every signal: try the primary fetcher, then the
//! secondary point-based provider if one is configured, then the static
//! default. A tier is only skipped when it reports unavailable — a
//! value that comes back is accepted as-is, with no plausibility
//! re-check beyond presence. Resolution never fails.

use std::future::Future;

use agromap_signal_models::{Resolved, SignalOutcome, SignalTier};

/// Resolves one signal through the fallback tiers.
///
/// `signal` names the signal in diagnostic logs. Pass `None` for
/// `secondary` when no point-based provider exists for this signal.
pub async fn resolve<T, P, S>(
    signal: &str,
    primary: P,
    secondary: Option<S>,
    default_value: T,
) -> Resolved<T>
where
    T: std::fmt::Debug,
    P: Future<Output = SignalOutcome<T>>,
    S: Future<Output = SignalOutcome<T>>,
{
    match primary.await {
        SignalOutcome::Available { value, source } => {
            log::debug!("{signal}: resolved at {source} tier: {value:?}");
            return Resolved { value, source };
        }
        SignalOutcome::Unavailable { reason } => {
            log::warn!("{signal}: primary tier unavailable: {reason}");
        }
    }

    if let Some(secondary) = secondary {
        match secondary.await {
            SignalOutcome::Available { value, source } => {
                log::debug!("{signal}: resolved at {source} tier: {value:?}");
                return Resolved { value, source };
            }
            SignalOutcome::Unavailable { reason } => {
                log::warn!("{signal}: secondary tier unavailable: {reason}");
            }
        }
    }

    log::info!("{signal}: substituting static default {default_value:?}");
    Resolved {
        value: default_value,
        source: SignalTier::Default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agromap_signal_models::defaults;
    use std::future::ready;

    fn available<T>(value: T, source: SignalTier) -> std::future::Ready<SignalOutcome<T>> {
        ready(SignalOutcome::Available { value, source })
    }

    fn unavailable<T>(reason: &str) -> std::future::Ready<SignalOutcome<T>> {
        ready(SignalOutcome::unavailable(reason))
    }

    #[tokio::test]
    async fn primary_wins_without_polling_secondary() {
        let secondary = async {
            panic!("secondary must not be polled when primary succeeds");
        };
        let resolved = resolve(
            "ndvi",
            available(0.62, SignalTier::Primary),
            Some(secondary),
            defaults::NDVI,
        )
        .await;
        assert_eq!(resolved.value, 0.62);
        assert_eq!(resolved.source, SignalTier::Primary);
    }

    #[tokio::test]
    async fn secondary_is_tried_before_default() {
        let resolved = resolve(
            "soil",
            unavailable("engine down"),
            Some(available(5.9, SignalTier::Secondary)),
            defaults::SOIL_PH,
        )
        .await;
        assert_eq!(resolved.value, 5.9);
        assert_eq!(resolved.source, SignalTier::Secondary);
    }

    #[tokio::test]
    async fn extreme_values_are_accepted_without_rechecks() {
        let resolved = resolve(
            "rainfall",
            available(0.0, SignalTier::Primary),
            None::<std::future::Ready<SignalOutcome<f64>>>,
            defaults::ANNUAL_RAINFALL_MM,
        )
        .await;
        assert_eq!(resolved.value, 0.0);
        assert_eq!(resolved.source, SignalTier::Primary);
    }

    #[tokio::test]
    async fn exhausted_tiers_fall_to_the_default() {
        let resolved = resolve(
            "soil",
            unavailable("engine down"),
            Some(unavailable("provider down")),
            defaults::SOIL_PH,
        )
        .await;
        assert_eq!(resolved.value, defaults::SOIL_PH);
        assert_eq!(resolved.source, SignalTier::Default);
    }

    #[tokio::test]
    async fn missing_secondary_falls_straight_to_default() {
        let resolved = resolve(
            "imagery",
            unavailable::<String>("engine down"),
            None::<std::future::Ready<SignalOutcome<String>>>,
            defaults::IMAGE_URL.to_string(),
        )
        .await;
        assert_eq!(resolved.value, defaults::IMAGE_URL);
        assert_eq!(resolved.source, SignalTier::Default);
    }
}
