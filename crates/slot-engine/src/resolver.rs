//! Priority resolution: which template governs a given date.
//!
//! A flat scan over the snapshot. Inactive templates and templates whose date
//! range misses the date are ignored; among the rest the lowest rank wins.
//! Rank ties are broken by ascending template id and reported as
//! [`AmbiguousPriority`] so venue managers can fix the overlap.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Result, ScheduleError};
use crate::model::{ScheduleTemplate, TemplateId};

/// Longest span, in days, a single range query may cover.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Outcome of resolving a date against a venue's templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Resolution<'a> {
    /// No active template covers the date. Not an error.
    Closed,
    Effective {
        template: &'a ScheduleTemplate,
        #[serde(skip_serializing_if = "Option::is_none")]
        ambiguity: Option<AmbiguousPriority>,
    },
}

impl<'a> Resolution<'a> {
    pub fn template(&self) -> Option<&'a ScheduleTemplate> {
        match self {
            Resolution::Closed => None,
            Resolution::Effective { template, .. } => Some(template),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Resolution::Closed)
    }
}

/// Several active templates shared the winning rank on `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbiguousPriority {
    pub date: NaiveDate,
    pub rank: u32,
    pub chosen: TemplateId,
    /// Every tied id, ascending, `chosen` included.
    pub contenders: Vec<TemplateId>,
}

/// Select the template governing `date`, or `None` if the venue is closed.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use slot_engine::model::{ScheduleTemplate, TemplateStatus, TimeWindow};
/// use slot_engine::resolver::resolve_effective_template;
///
/// let base = ScheduleTemplate {
///     id: 1,
///     place_id: 1,
///     valid_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     valid_to: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
///     rank: 5,
///     status: TemplateStatus::Active,
///     min_duration_minutes: 60,
///     max_duration_minutes: 180,
///     windows: vec![TimeWindow::new(540, 1260)],
/// };
/// let holiday = ScheduleTemplate { id: 2, rank: 1, ..base.clone() };
///
/// let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let templates = [base, holiday];
/// let chosen = resolve_effective_template(date, &templates).unwrap();
/// assert_eq!(chosen.id, 2);
/// ```
pub fn resolve_effective_template(
    date: NaiveDate,
    templates: &[ScheduleTemplate],
) -> Option<&ScheduleTemplate> {
    resolve_effective_template_detailed(date, templates).template()
}

/// Like [`resolve_effective_template`], but also reports rank ties.
pub fn resolve_effective_template_detailed(
    date: NaiveDate,
    templates: &[ScheduleTemplate],
) -> Resolution<'_> {
    let mut best: Option<&ScheduleTemplate> = None;
    let mut tied: Vec<TemplateId> = Vec::new();

    for candidate in templates
        .iter()
        .filter(|t| t.is_active() && t.covers(date))
    {
        match best {
            Some(current) if candidate.rank > current.rank => {}
            Some(current) if candidate.rank == current.rank => {
                tied.push(candidate.id);
                if candidate.id < current.id {
                    best = Some(candidate);
                }
            }
            _ => {
                tied.clear();
                tied.push(candidate.id);
                best = Some(candidate);
            }
        }
    }

    let Some(template) = best else {
        tracing::debug!(%date, "no active template covers date");
        return Resolution::Closed;
    };

    let ambiguity = if tied.len() > 1 {
        tied.sort_unstable();
        let info = AmbiguousPriority {
            date,
            rank: template.rank,
            chosen: template.id,
            contenders: tied,
        };
        tracing::warn!(
            %date,
            rank = info.rank,
            chosen = info.chosen,
            contenders = ?info.contenders,
            "rank tie broken by lowest template id"
        );
        Some(info)
    } else {
        None
    };

    tracing::debug!(%date, template = template.id, rank = template.rank, "resolved effective template");
    Resolution::Effective {
        template,
        ambiguity,
    }
}

/// Resolve every day in `from..=to`. Empty when `from > to`.
///
/// # Errors
///
/// [`ScheduleError::RangeTooLong`] if the range covers more than
/// [`MAX_RANGE_DAYS`] days.
pub fn resolve_date_range(
    from: NaiveDate,
    to: NaiveDate,
    templates: &[ScheduleTemplate],
) -> Result<Vec<(NaiveDate, Resolution<'_>)>> {
    Ok(days_in_range(from, to)?
        .map(|d| (d, resolve_effective_template_detailed(d, templates)))
        .collect())
}

/// Days of `from..=to`, refusing spans over [`MAX_RANGE_DAYS`].
pub(crate) fn days_in_range(
    from: NaiveDate,
    to: NaiveDate,
) -> Result<impl Iterator<Item = NaiveDate>> {
    if (to - from).num_days() >= MAX_RANGE_DAYS {
        return Err(ScheduleError::RangeTooLong {
            from,
            to,
            max_days: MAX_RANGE_DAYS,
        });
    }
    Ok(from.iter_days().take_while(move |d| *d <= to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TemplateStatus, TimeWindow};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn template(id: TemplateId, rank: u32, from: NaiveDate, to: NaiveDate) -> ScheduleTemplate {
        ScheduleTemplate {
            id,
            place_id: 1,
            valid_from: from,
            valid_to: to,
            rank,
            status: TemplateStatus::Active,
            min_duration_minutes: 60,
            max_duration_minutes: 180,
            windows: vec![TimeWindow::new(540, 1260)],
        }
    }

    #[test]
    fn test_lower_rank_wins() {
        let templates = vec![
            template(1, 5, date(2024, 1, 1), date(2024, 12, 31)),
            template(2, 1, date(2024, 5, 1), date(2024, 6, 30)),
        ];
        let chosen = resolve_effective_template(date(2024, 6, 1), &templates).unwrap();
        assert_eq!(chosen.id, 2);
    }

    #[test]
    fn test_closed_when_nothing_covers() {
        let templates = vec![template(1, 0, date(2024, 7, 1), date(2024, 7, 31))];
        let res = resolve_effective_template_detailed(date(2024, 6, 1), &templates);
        assert!(res.is_closed());
    }

    #[test]
    fn test_inactive_templates_ignored() {
        let mut override_t = template(2, 0, date(2024, 6, 1), date(2024, 6, 1));
        override_t.status = TemplateStatus::Inactive;
        let templates = vec![template(1, 9, date(2024, 1, 1), date(2024, 12, 31)), override_t];
        let chosen = resolve_effective_template(date(2024, 6, 1), &templates).unwrap();
        assert_eq!(chosen.id, 1);
    }

    #[test]
    fn test_tie_broken_by_lowest_id_regardless_of_order() {
        let a = template(30, 2, date(2024, 1, 1), date(2024, 12, 31));
        let b = template(10, 2, date(2024, 1, 1), date(2024, 12, 31));
        let c = template(20, 2, date(2024, 1, 1), date(2024, 12, 31));

        for templates in [
            vec![a.clone(), b.clone(), c.clone()],
            vec![c.clone(), a.clone(), b.clone()],
        ] {
            match resolve_effective_template_detailed(date(2024, 6, 1), &templates) {
                Resolution::Effective {
                    template,
                    ambiguity: Some(info),
                } => {
                    assert_eq!(template.id, 10);
                    assert_eq!(info.contenders, vec![10, 20, 30]);
                    assert_eq!(info.rank, 2);
                }
                other => panic!("expected ambiguous resolution, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_tie_at_losing_rank_not_reported() {
        let templates = vec![
            template(1, 5, date(2024, 1, 1), date(2024, 12, 31)),
            template(2, 5, date(2024, 1, 1), date(2024, 12, 31)),
            template(3, 1, date(2024, 1, 1), date(2024, 12, 31)),
        ];
        match resolve_effective_template_detailed(date(2024, 6, 1), &templates) {
            Resolution::Effective {
                template,
                ambiguity,
            } => {
                assert_eq!(template.id, 3);
                assert!(ambiguity.is_none());
            }
            Resolution::Closed => panic!("expected a template"),
        }
    }

    #[test]
    fn test_date_range_switches_templates() {
        let templates = vec![
            template(1, 5, date(2024, 1, 1), date(2024, 12, 31)),
            template(2, 1, date(2024, 6, 2), date(2024, 6, 2)),
        ];
        let days = resolve_date_range(date(2024, 6, 1), date(2024, 6, 3), &templates).unwrap();
        let ids: Vec<_> = days
            .iter()
            .map(|(_, r)| r.template().map(|t| t.id))
            .collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(1)]);
    }

    #[test]
    fn test_date_range_reversed_is_empty() {
        let templates = vec![template(1, 5, date(2024, 1, 1), date(2024, 12, 31))];
        assert!(resolve_date_range(date(2024, 6, 3), date(2024, 6, 1), &templates)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_date_range_span_capped() {
        let templates = vec![template(1, 5, date(2024, 1, 1), date(2024, 12, 31))];

        let full_year = resolve_date_range(date(2024, 1, 1), date(2024, 12, 31), &templates);
        assert_eq!(full_year.unwrap().len(), 366);

        let err = resolve_date_range(date(2024, 1, 1), date(9999, 12, 31), &templates).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::RangeTooLong {
                from: date(2024, 1, 1),
                to: date(9999, 12, 31),
                max_days: MAX_RANGE_DAYS,
            }
        );
    }
}
