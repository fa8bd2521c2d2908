//! Tracks deprivation flags between evaluations so that only a false -> true
//! transition produces notifications.

use std::collections::{BTreeSet, HashMap};

use tracing::{info, warn};
use uuid::Uuid;

use crate::config::DeprivationSettings;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Notification, Recipient, StudentStanding};

type Key = (String, String);

#[derive(Debug, Default)]
pub struct DeprivationMonitor {
    flagged: HashMap<Key, bool>,
    pending: BTreeSet<Key>,
    notifications: Vec<Notification>,
}

impl DeprivationMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the latest standings. Returns the standings that newly crossed
    /// the threshold in this pass.
    pub fn observe<'a>(
        &mut self,
        standings: &'a [StudentStanding],
        settings: &DeprivationSettings,
    ) -> Vec<&'a StudentStanding> {
        let mut newly_deprived = Vec::new();

        for standing in standings {
            let key = (standing.student_id.clone(), standing.course_id.clone());
            let was_deprived = self
                .flagged
                .insert(key.clone(), standing.is_deprived)
                .unwrap_or(false);

            match (was_deprived, standing.is_deprived) {
                (false, true) => {
                    info!(
                        student_id = %standing.student_id,
                        course_id = %standing.course_id,
                        absence = standing.absence_percentage,
                        "student crossed deprivation threshold"
                    );
                    if settings.require_confirmation {
                        self.pending.insert(key);
                    } else {
                        self.notify(standing, settings);
                    }
                    newly_deprived.push(standing);
                }
                (true, false) => {
                    info!(
                        student_id = %standing.student_id,
                        course_id = %standing.course_id,
                        "student back under deprivation threshold"
                    );
                    self.pending.remove(&key);
                }
                _ => {}
            }
        }

        newly_deprived
    }

    /// Administrator confirmation of a held deprivation; sends its notifications.
    pub fn confirm(
        &mut self,
        standing: &StudentStanding,
        settings: &DeprivationSettings,
    ) -> TrackerResult<()> {
        let key = (standing.student_id.clone(), standing.course_id.clone());
        if !self.pending.remove(&key) {
            return Err(TrackerError::NothingToConfirm {
                student_id: key.0,
                course_id: key.1,
            });
        }
        self.notify(standing, settings);
        Ok(())
    }

    pub fn pending(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pending.iter().map(|(s, c)| (s.as_str(), c.as_str()))
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, standing: &StudentStanding, settings: &DeprivationSettings) {
        let mut recipients = Vec::new();
        if settings.notify_teacher {
            recipients.push(Recipient::Teacher);
        }
        if settings.notify_student {
            recipients.push(Recipient::Student);
        }
        if recipients.is_empty() {
            warn!(
                student_id = %standing.student_id,
                "deprivation reached with notifications disabled"
            );
            return;
        }

        for recipient in recipients {
            let message = match recipient {
                Recipient::Teacher => format!(
                    "{} has exceeded the absence limit in {} ({:.1}% > {:.1}%)",
                    standing.student_name,
                    standing.course_id,
                    standing.absence_percentage,
                    settings.threshold_percentage
                ),
                Recipient::Student => format!(
                    "You have been deprived from {} after {} unexcused absences ({:.1}%)",
                    standing.course_id, standing.counted_absences, standing.absence_percentage
                ),
            };
            self.notifications.push(Notification {
                id: Uuid::new_v4(),
                recipient,
                student_id: standing.student_id.clone(),
                course_id: standing.course_id.clone(),
                message,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(absence_percentage: f64, threshold: f64) -> StudentStanding {
        StudentStanding {
            student_id: "s-1".to_string(),
            student_name: "Avery Lee".to_string(),
            course_id: "c-1".to_string(),
            recorded_sessions: 10,
            attended_sessions: 5,
            counted_absences: 5,
            attendance_rate: 50,
            absence_percentage,
            is_deprived: absence_percentage > threshold,
        }
    }

    #[test]
    fn notifies_once_per_transition() {
        let settings = DeprivationSettings::default();
        let mut monitor = DeprivationMonitor::new();
        let over = vec![standing(30.0, settings.threshold_percentage)];

        assert_eq!(monitor.observe(&over, &settings).len(), 1);
        assert_eq!(monitor.notifications().len(), 2);

        assert!(monitor.observe(&over, &settings).is_empty());
        assert_eq!(monitor.notifications().len(), 2);
    }

    #[test]
    fn dropping_below_rearms_the_transition() {
        let settings = DeprivationSettings::default();
        let mut monitor = DeprivationMonitor::new();
        let over = vec![standing(30.0, settings.threshold_percentage)];
        let under = vec![standing(10.0, settings.threshold_percentage)];

        monitor.observe(&over, &settings);
        monitor.observe(&under, &settings);
        monitor.observe(&over, &settings);
        assert_eq!(monitor.notifications().len(), 4);
    }

    #[test]
    fn respects_recipient_flags() {
        let settings = DeprivationSettings {
            notify_student: false,
            ..DeprivationSettings::default()
        };
        let mut monitor = DeprivationMonitor::new();
        monitor.observe(&[standing(40.0, settings.threshold_percentage)], &settings);
        let notes = monitor.drain_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].recipient, Recipient::Teacher);
        assert!(monitor.notifications().is_empty());
    }

    #[test]
    fn confirmation_holds_notifications() {
        let settings = DeprivationSettings {
            require_confirmation: true,
            ..DeprivationSettings::default()
        };
        let mut monitor = DeprivationMonitor::new();
        let over = standing(40.0, settings.threshold_percentage);
        monitor.observe(std::slice::from_ref(&over), &settings);
        assert!(monitor.notifications().is_empty());
        assert_eq!(monitor.pending().count(), 1);

        monitor.confirm(&over, &settings).unwrap();
        assert_eq!(monitor.notifications().len(), 2);
        assert!(matches!(
            monitor.confirm(&over, &settings),
            Err(TrackerError::NothingToConfirm { .. })
        ));
    }

    #[test]
    fn recovery_clears_pending_confirmation() {
        let settings = DeprivationSettings {
            require_confirmation: true,
            ..DeprivationSettings::default()
        };
        let mut monitor = DeprivationMonitor::new();
        monitor.observe(&[standing(40.0, 25.0)], &settings);
        monitor.observe(&[standing(10.0, 25.0)], &settings);
        assert_eq!(monitor.pending().count(), 0);
    }
}
