//! Chapter certification trigger.
//!
//! After every progress transition the owning chapter is re-checked with
//! the strict all-subjects-passed rule. When a chapter is complete and
//! this device has not requested its certificate yet, issuance is
//! requested from the collaborator. The local hint only avoids redundant
//! network calls; the issuer's existence check is what actually prevents
//! duplicates, including across devices and concurrent tabs.

use chrono::Utc;

use academy_core::aggregate::chapter_completed;
use academy_core::model::Curriculum;
use academy_core::traits::{CertificateIssuer, IssueReceipt, IssueRequest};

use crate::cache::ProgressCache;

/// Check one chapter and request issuance if it is complete and not yet
/// requested from this device.
///
/// Returns the receipt when a request was made and succeeded. Failures are
/// logged and leave the hint unset, so the next transition retries.
pub async fn certify_chapter(
    cache: &mut ProgressCache,
    curriculum: &Curriculum,
    issuer: &dyn CertificateIssuer,
    level_key: &str,
    chapter_id: &str,
) -> Option<IssueReceipt> {
    let chapter = curriculum.chapter(level_key, chapter_id)?;

    let progress = cache.to_progress_map(Utc::now());
    if !chapter_completed(&progress, level_key, chapter) {
        return None;
    }
    if cache.issue_requested(level_key, chapter_id) {
        return None;
    }

    let request = IssueRequest {
        level_key: level_key.to_string(),
        chapter_id: chapter_id.to_string(),
        chapter_title: chapter.title.clone(),
    };
    match issuer.issue(&request).await {
        Ok(receipt) => {
            cache.set_issue_requested(level_key, chapter_id);
            if receipt.already {
                tracing::debug!(
                    "certificate for {level_key}/{chapter_id} already issued as {}",
                    receipt.certificate.reference
                );
            } else {
                tracing::info!(
                    "certificate {} issued for {level_key}/{chapter_id}",
                    receipt.certificate.reference
                );
            }
            Some(receipt)
        }
        Err(e) => {
            tracing::warn!(
                "certificate issuance for {level_key}/{chapter_id} failed, will retry: {e:#}"
            );
            None
        }
    }
}

/// Sweep every chapter of the curriculum, e.g. after reconciliation
/// restored progress recorded on another device.
pub async fn certify_all(
    cache: &mut ProgressCache,
    curriculum: &Curriculum,
    issuer: &dyn CertificateIssuer,
) -> Vec<IssueReceipt> {
    let mut receipts = Vec::new();
    let chapters: Vec<(String, String)> = curriculum
        .levels
        .iter()
        .flat_map(|l| l.chapters.iter().map(|c| (l.key.clone(), c.id.clone())))
        .collect();
    for (level_key, chapter_id) in chapters {
        if let Some(receipt) =
            certify_chapter(cache, curriculum, issuer, &level_key, &chapter_id).await
        {
            receipts.push(receipt);
        }
    }
    receipts
}

#[cfg(test)]
mod tests {
    use academy_client::InMemoryCertificateIssuer;
    use academy_core::key::ModuleKey;
    use academy_core::model::{Chapter, Curriculum, Level, Subject};
    use academy_core::traits::{CertificateIssuer as _, Session};

    use super::*;

    fn curriculum() -> Curriculum {
        let subject = |id: &str| Subject {
            id: id.into(),
            title: id.into(),
            minutes: None,
            video_ref: None,
            quiz_ref: Some(id.into()),
        };
        Curriculum {
            levels: vec![Level {
                key: "Niveau 1".into(),
                chapters: vec![
                    Chapter {
                        id: "1".into(),
                        title: "Santé générale".into(),
                        mandatory: true,
                        subjects: vec![subject("vitamine"), subject("mineraux")],
                    },
                    Chapter {
                        id: "2".into(),
                        title: "Santé Digestive".into(),
                        mandatory: true,
                        subjects: vec![subject("greens")],
                    },
                ],
            }],
        }
    }

    fn issuer() -> InMemoryCertificateIssuer {
        InMemoryCertificateIssuer::new(Session {
            user_id: "u1".into(),
            email: "u1@example.com".into(),
            display_name: None,
        })
    }

    fn complete_chapter_one(cache: &mut ProgressCache) {
        cache.apply_server_row(&ModuleKey::new("Niveau 1", "1", "vitamine"), 95, true, 0);
        cache.apply_server_row(&ModuleKey::new("Niveau 1", "1", "mineraux"), 100, true, 0);
    }

    #[tokio::test]
    async fn incomplete_chapter_never_calls_the_issuer() {
        let curriculum = curriculum();
        let issuer = issuer();
        let mut cache = ProgressCache::new();
        cache.apply_server_row(&ModuleKey::new("Niveau 1", "1", "vitamine"), 95, true, 0);
        cache.apply_server_row(&ModuleKey::new("Niveau 1", "1", "mineraux"), 85, true, 0);

        let receipt = certify_chapter(&mut cache, &curriculum, &issuer, "Niveau 1", "1").await;
        assert!(receipt.is_none());
        assert_eq!(issuer.issue_calls(), 0);
        assert!(!cache.issue_requested("Niveau 1", "1"));
    }

    #[tokio::test]
    async fn completed_chapter_is_certified_once() {
        let curriculum = curriculum();
        let issuer = issuer();
        let mut cache = ProgressCache::new();
        complete_chapter_one(&mut cache);

        let receipt = certify_chapter(&mut cache, &curriculum, &issuer, "Niveau 1", "1")
            .await
            .unwrap();
        assert!(!receipt.already);
        assert_eq!(receipt.certificate.chapter_title, "Santé générale");
        assert!(cache.issue_requested("Niveau 1", "1"));

        // The hint short-circuits the second check locally.
        let receipt = certify_chapter(&mut cache, &curriculum, &issuer, "Niveau 1", "1").await;
        assert!(receipt.is_none());
        assert_eq!(issuer.issue_calls(), 1);
        assert_eq!(issuer.list_mine().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn another_device_request_converges_via_already() {
        let curriculum = curriculum();
        let issuer = issuer();
        // The other device already obtained the certificate.
        issuer
            .issue(&IssueRequest {
                level_key: "Niveau 1".into(),
                chapter_id: "1".into(),
                chapter_title: "Santé générale".into(),
            })
            .await
            .unwrap();

        let mut cache = ProgressCache::new();
        complete_chapter_one(&mut cache);

        let receipt = certify_chapter(&mut cache, &curriculum, &issuer, "Niveau 1", "1")
            .await
            .unwrap();
        assert!(receipt.already);
        // Still exactly one certificate, and the hint converges.
        assert_eq!(issuer.list_mine().await.unwrap().len(), 1);
        assert!(cache.issue_requested("Niveau 1", "1"));
    }

    #[tokio::test]
    async fn issuance_failure_leaves_the_hint_unset() {
        struct FailingIssuer;
        #[async_trait::async_trait]
        impl CertificateIssuer for FailingIssuer {
            async fn issue(
                &self,
                _request: &IssueRequest,
            ) -> anyhow::Result<academy_core::traits::IssueReceipt> {
                anyhow::bail!("issuer unavailable")
            }
            async fn list_mine(
                &self,
            ) -> anyhow::Result<Vec<academy_core::traits::Certificate>> {
                Ok(vec![])
            }
        }

        let curriculum = curriculum();
        let mut cache = ProgressCache::new();
        complete_chapter_one(&mut cache);

        let receipt =
            certify_chapter(&mut cache, &curriculum, &FailingIssuer, "Niveau 1", "1").await;
        assert!(receipt.is_none());
        // Unset hint means the next transition retries.
        assert!(!cache.issue_requested("Niveau 1", "1"));

        let issuer = issuer();
        let receipt = certify_chapter(&mut cache, &curriculum, &issuer, "Niveau 1", "1").await;
        assert!(receipt.is_some());
    }

    #[tokio::test]
    async fn sweep_certifies_every_completed_chapter() {
        let curriculum = curriculum();
        let issuer = issuer();
        let mut cache = ProgressCache::new();
        complete_chapter_one(&mut cache);
        cache.apply_server_row(&ModuleKey::new("Niveau 1", "2", "greens"), 90, true, 0);

        let receipts = certify_all(&mut cache, &curriculum, &issuer).await;
        assert_eq!(receipts.len(), 2);
        assert_eq!(issuer.list_mine().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_chapter_is_a_no_op() {
        let curriculum = curriculum();
        let issuer = issuer();
        let mut cache = ProgressCache::new();
        let receipt = certify_chapter(&mut cache, &curriculum, &issuer, "Niveau 1", "42").await;
        assert!(receipt.is_none());
        assert_eq!(issuer.issue_calls(), 0);
    }
}
