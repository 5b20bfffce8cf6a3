//! Spreadsheet uploads.
//!
//! Every `.xlsx` document passes the same guards: file type, then the
//! processed-file marker. Uploads from non-admins are only announced to the
//! admins. An admin upload runs the whole cycle in place: download, parse,
//! audit copy back to the uploader, upsert, distribution and a summary. The
//! event loop waits for it, so a large file holds up every other chat until
//! it is done.

use super::context::BotContext;
use super::events::Sender;
use super::messages;
use crate::config::BotVariant;
use crate::error::BotError;
use crate::ingest;
use crate::job_controller::state::UploadJob;
use crate::pipeline::matching::{match_recipients, Delivery};
use crate::pipeline::upsert::upsert_rows;
use crate::transport::update::Document;
use common::model::row::Row;
use common::model::ChatId;
use log::{info, warn};

const XLSX_EXTENSION: &str = ".xlsx";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DistributionReport {
    pub delivered: usize,
    pub failed: usize,
}

fn is_xlsx(document: &Document) -> bool {
    document
        .file_name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().ends_with(XLSX_EXTENSION))
}

impl BotContext {
    pub(super) async fn on_document(
        &mut self,
        chat_id: ChatId,
        sender: &Sender,
        document: &Document,
    ) -> Result<(), BotError> {
        if !is_xlsx(document) {
            self.messenger.send_text(chat_id, messages::ONLY_XLSX).await?;
            return Ok(());
        }
        if !self.processed_files.insert(document.file_unique_id.clone()) {
            info!("File {} was already processed", document.file_unique_id);
            self.messenger
                .send_text(chat_id, messages::DUPLICATE_UPLOAD)
                .await?;
            return Ok(());
        }

        if !self.admins.contains(sender.id) {
            return self.forward_to_admins(chat_id, sender).await;
        }

        let job = self.jobs.create_job().await;
        info!(
            "Admin {} uploaded {} (job {})",
            sender.id, document.file_unique_id, job.job_id
        );
        match self.run_upload(chat_id, sender, document, &job).await {
            Ok(summary) => {
                job.complete(summary).await;
                Ok(())
            }
            Err(e) => {
                // Only download, parse and the audit copy can fail, all before
                // anything is stored or distributed, so a retry is safe.
                self.processed_files.remove(&document.file_unique_id);
                job.fail(e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn forward_to_admins(&self, chat_id: ChatId, sender: &Sender) -> Result<(), BotError> {
        self.messenger
            .send_text(chat_id, messages::UPLOAD_RECEIVED)
            .await?;
        let notice = messages::upload_notice(&sender.mention());
        for &admin in self.admins.members() {
            if let Err(e) = self.messenger.send_text(admin, &notice).await {
                warn!("Could not notify admin {}: {}", admin, e);
            }
        }
        Ok(())
    }

    async fn run_upload(
        &self,
        chat_id: ChatId,
        sender: &Sender,
        document: &Document,
        job: &UploadJob,
    ) -> Result<String, BotError> {
        let bytes = self.messenger.download_file(&document.file_id).await?;
        let rows = ingest::parse(&bytes)?;
        info!("Parsed {} rows from {}", rows.len(), document.file_unique_id);

        self.dispatcher.deliver_json(chat_id, &rows, "data").await?;

        let upsert = upsert_rows(self.store.as_ref(), &rows, |done, total| {
            job.progress(done, total)
        })
        .await;
        info!("Upsert finished: {:?}", upsert);

        let distribution = self.distribute(sender.id, &rows).await;
        let summary = messages::upload_summary(rows.len(), &upsert, distribution.delivered);
        // Rows are stored and delivered by now; the file stays marked either way.
        if let Err(e) = self.messenger.send_text(chat_id, &summary).await {
            warn!("Could not send the upload summary to {}: {}", chat_id, e);
        }
        Ok(summary)
    }

    /// Works out who gets which rows. Admins and the uploader are never
    /// among them.
    async fn deliveries(&self, uploader: ChatId, rows: &[Row]) -> Vec<Delivery> {
        let excluded = |id: ChatId| id == uploader || self.admins.contains(id);
        match self.variant {
            BotVariant::Simple => {
                if rows.is_empty() {
                    return Vec::new();
                }
                self.registered
                    .iter()
                    .filter(|&&id| !excluded(id))
                    .map(|&chat_id| Delivery {
                        chat_id,
                        rows: rows.to_vec(),
                    })
                    .collect()
            }
            BotVariant::Directory => {
                let recipients = match self.store.list_users().await {
                    Ok(recipients) => recipients,
                    Err(e) => {
                        warn!("Recipient directory unavailable: {}", e);
                        Vec::new()
                    }
                };
                match_recipients(
                    recipients.iter().filter(|r| !excluded(r.chat_id)),
                    rows,
                    self.phone_match,
                )
            }
        }
    }

    async fn distribute(&self, uploader: ChatId, rows: &[Row]) -> DistributionReport {
        let mut report = DistributionReport::default();
        for delivery in self.deliveries(uploader, rows).await {
            match self.deliver(&delivery).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!("Delivery to {} failed: {}", delivery.chat_id, e);
                    report.failed += 1;
                }
            }
        }
        info!(
            "Distribution finished: {} delivered, {} failed",
            report.delivered, report.failed
        );
        report
    }

    async fn deliver(&self, delivery: &Delivery) -> Result<(), BotError> {
        self.messenger
            .send_text(delivery.chat_id, messages::RECIPIENT_INTRO)
            .await?;
        self.dispatcher
            .deliver_json(delivery.chat_id, &delivery.rows, "userData")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::context::testing::{harness, shared_harness, Harness, ADMIN, SUPERADMIN};
    use super::*;
    use crate::ingest::fixture::{workbook, Cell};
    use crate::store::memory::MemoryStore;
    use crate::transport::recording::Sent;
    use common::model::recipient::{Recipient, Role};

    const USER: ChatId = 7;

    fn sender(id: ChatId) -> Sender {
        Sender {
            id,
            username: Some("vali".to_string()),
            first_name: "Vali".to_string(),
        }
    }

    fn document(file_id: &str, unique_id: &str, name: &str) -> Document {
        Document {
            file_id: file_id.to_string(),
            file_unique_id: unique_id.to_string(),
            file_name: Some(name.to_string()),
        }
    }

    fn recipient(chat_id: ChatId, phone: &str) -> Recipient {
        Recipient {
            chat_id,
            first_name: "Vali".to_string(),
            phone_number: phone.to_string(),
            role: Role::User,
        }
    }

    fn payroll() -> Vec<u8> {
        workbook(&[
            vec![
                Cell::Text("user_full_name"),
                Cell::Text("month"),
                Cell::Text("organization_name"),
                Cell::Text("phone_number"),
                Cell::Text("salary"),
            ],
            vec![
                Cell::Text("Aliyev Vali"),
                Cell::Text("Yanvar"),
                Cell::Text("Toshkent IT"),
                Cell::Number(998901234567.0),
                Cell::Number(5000000.0),
            ],
            vec![
                Cell::Text("Karimova Lola"),
                Cell::Text("Yanvar"),
                Cell::Text("Toshkent IT"),
                Cell::Text("+998907654321"),
                Cell::Number(4500000.0),
            ],
            vec![
                Cell::Text("Nomsiz"),
                Cell::Blank,
                Cell::Text("Toshkent IT"),
                Cell::Text("998901234567"),
                Cell::Number(1.0),
            ],
        ])
    }

    fn text(chat_id: ChatId, text: &str) -> Sent {
        Sent::Text {
            chat_id,
            text: text.to_string(),
        }
    }

    async fn upload(h: &mut Harness, from: ChatId, doc: &Document) -> Result<(), BotError> {
        h.ctx.on_document(from, &sender(from), doc).await
    }

    #[tokio::test]
    async fn rejects_other_file_types() {
        let mut h = harness(BotVariant::Directory, MemoryStore::default());
        upload(&mut h, USER, &document("F", "U", "oylik.csv")).await.unwrap();

        assert_eq!(h.messenger.sent(), vec![text(USER, messages::ONLY_XLSX)]);
        assert!(h.ctx.processed_files.is_empty());
    }

    #[test]
    fn extension_check_ignores_case() {
        assert!(is_xlsx(&document("F", "U", "OYLIK.XLSX")));
        assert!(!is_xlsx(&document("F", "U", "oylik.xls")));
        assert!(!is_xlsx(&Document {
            file_id: "F".to_string(),
            file_unique_id: "U".to_string(),
            file_name: None,
        }));
    }

    #[tokio::test]
    async fn non_admin_uploads_go_to_admin_review() {
        let mut h = harness(BotVariant::Directory, MemoryStore::default());
        h.messenger.add_file("F", payroll());

        upload(&mut h, USER, &document("F", "U", "oylik.xlsx")).await.unwrap();

        let notice = messages::upload_notice("@vali");
        assert_eq!(
            h.messenger.sent(),
            vec![
                text(USER, messages::UPLOAD_RECEIVED),
                text(ADMIN, &notice),
                text(SUPERADMIN, &notice),
            ]
        );
        assert_eq!(h.store.calls(), 0);
    }

    #[tokio::test]
    async fn admin_upload_stores_and_distributes_by_phone() {
        let store = MemoryStore::with_users(vec![
            recipient(USER, "998901234567"),
            recipient(8, "998907654321"),
            recipient(9, "998900000000"),
            recipient(ADMIN, "998901234567"),
        ]);
        let mut h = harness(BotVariant::Directory, store);
        h.messenger.add_file("F", payroll());

        upload(&mut h, ADMIN, &document("F", "U", "oylik.xlsx")).await.unwrap();

        assert_eq!(h.store.data().len(), 2);

        let to_user = h.messenger.sent_to(USER);
        assert_eq!(to_user[0], text(USER, messages::RECIPIENT_INTRO));
        match &to_user[1] {
            Sent::Html { html, .. } => {
                assert!(html.contains("Aliyev Vali"));
                assert!(html.contains("Nomsiz"));
                assert!(!html.contains("Karimova Lola"));
            }
            other => panic!("unexpected send: {:?}", other),
        }
        assert_eq!(h.messenger.sent_to(8).len(), 2);
        assert!(h.messenger.sent_to(9).is_empty());

        // Audit copy first, summary last; no intro for the admin.
        let to_admin = h.messenger.sent_to(ADMIN);
        assert_eq!(to_admin.len(), 2);
        match (&to_admin[0], &to_admin[1]) {
            (Sent::Html { html, .. }, Sent::Text { text, .. }) => {
                assert!(html.contains("Karimova Lola"));
                assert!(text.contains("Yangi yozuvlar: 2"));
                assert!(text.contains("foydalanuvchilar: 2"));
            }
            other => panic!("unexpected sends: {:?}", other),
        }

        let jobs = h.ctx.jobs.jobs.read().await;
        assert_eq!(jobs.len(), 1);
    }

    #[tokio::test]
    async fn same_file_twice_is_processed_once() {
        let mut h = harness(BotVariant::Directory, MemoryStore::default());
        h.messenger.add_file("F", payroll());
        let doc = document("F", "U", "oylik.xlsx");

        upload(&mut h, ADMIN, &doc).await.unwrap();
        let calls = h.store.calls();
        let sent = h.messenger.sent().len();

        upload(&mut h, ADMIN, &doc).await.unwrap();

        assert_eq!(h.store.calls(), calls);
        assert_eq!(h.messenger.sent().len(), sent + 1);
        assert_eq!(
            h.messenger.sent().last(),
            Some(&text(ADMIN, messages::DUPLICATE_UPLOAD))
        );
    }

    #[tokio::test]
    async fn reupload_after_restart_inserts_nothing_new() {
        let mut first = harness(BotVariant::Directory, MemoryStore::default());
        first.messenger.add_file("F", payroll());
        upload(&mut first, ADMIN, &document("F", "U", "oylik.xlsx"))
            .await
            .unwrap();
        assert_eq!(first.store.data().len(), 2);

        let mut second = shared_harness(BotVariant::Directory, first.store.clone());
        second.messenger.add_file("F", payroll());
        upload(&mut second, ADMIN, &document("F", "U", "oylik.xlsx"))
            .await
            .unwrap();

        assert_eq!(second.store.data().len(), 2);
    }

    #[tokio::test]
    async fn failed_cycle_unmarks_the_file() {
        let mut h = harness(BotVariant::Directory, MemoryStore::default());
        h.messenger.add_file("F", b"not a workbook".to_vec());
        let doc = document("F", "U", "oylik.xlsx");

        let result = upload(&mut h, ADMIN, &doc).await;

        assert!(matches!(result, Err(BotError::Ingest(_))));
        assert!(h.ctx.processed_files.is_empty());
        assert_eq!(h.store.calls(), 0);
    }

    #[tokio::test]
    async fn store_outage_still_reports_a_summary() {
        let mut h = harness(BotVariant::Directory, MemoryStore::default());
        h.store.set_unavailable(true);
        h.messenger.add_file("F", payroll());

        upload(&mut h, ADMIN, &document("F", "U", "oylik.xlsx")).await.unwrap();

        match h.messenger.sent().last() {
            Some(Sent::Text { text, .. }) => {
                assert!(text.contains("Saqlanmagan (xatolik): 2"));
                assert!(text.contains("foydalanuvchilar: 0"));
            }
            other => panic!("unexpected send: {:?}", other),
        }
    }

    #[tokio::test]
    async fn simple_mode_sends_everything_to_started_chats() {
        let mut h = harness(BotVariant::Simple, MemoryStore::default());
        h.ctx.registered = vec![USER, ADMIN, 8];
        h.messenger.add_file("F", payroll());

        upload(&mut h, ADMIN, &document("F", "U", "oylik.xlsx")).await.unwrap();

        for chat in [USER, 8] {
            match &h.messenger.sent_to(chat)[..] {
                [intro, Sent::Html { html, .. }] => {
                    assert_eq!(intro, &text(chat, messages::RECIPIENT_INTRO));
                    assert!(html.contains("Karimova Lola"));
                    assert!(html.contains("Aliyev Vali"));
                }
                other => panic!("unexpected sends: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn lost_summary_does_not_reopen_the_file() {
        let store = MemoryStore::with_users(vec![recipient(USER, "998901234567")]);
        let mut h = harness(BotVariant::Directory, store);
        h.messenger.add_file("F", payroll());
        h.messenger.fail_texts_starting_with("✅ Fayl");
        let doc = document("F", "U", "oylik.xlsx");

        upload(&mut h, ADMIN, &doc).await.unwrap();
        upload(&mut h, ADMIN, &doc).await.unwrap();

        assert!(h.ctx.processed_files.contains("U"));
        assert_eq!(h.store.data().len(), 2);
        let intros = h
            .messenger
            .sent_to(USER)
            .into_iter()
            .filter(|sent| *sent == text(USER, messages::RECIPIENT_INTRO))
            .count();
        assert_eq!(intros, 1);
        assert_eq!(
            h.messenger.sent().last(),
            Some(&text(ADMIN, messages::DUPLICATE_UPLOAD))
        );
    }
}
