// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The conversation state machine.
//
//   Idle --select op--> AwaitingFile(op)
//   AwaitingFile(PageSelection) --valid file--> AwaitingPageRange(upload)
//   AwaitingFile(op) --valid file--> Idle, result sent
//   AwaitingPageRange --page list--> Idle, result sent
//   any --back--> Idle, upload released
//
// A wrong file type leaves the state alone so the user can retry. A page
// list that yields no pages re-prompts and keeps the upload. Every failure
// ends in `Idle` with the upload released before the error is reported.

use std::path::PathBuf;

use hujjat_core::error::{HujjatError, Result};
use hujjat_core::human_errors::humanize_error;
use hujjat_core::{DocumentKind, Operation, UserId};
use hujjat_document::{PageSet, Pipeline, PipelineOutput};
use tracing::{error, info, instrument, warn};

use crate::messages;
use crate::reply::{BACK_TO_MAIN, Event, Keyboard, MenuButton, Reply};
use crate::session::{Session, StoredUpload};
use crate::store::SessionStore;

pub struct SessionMachine {
    pipeline: Pipeline,
    store: SessionStore,
    upload_root: Option<PathBuf>,
}

impl SessionMachine {
    /// `upload_root` is where pending uploads wait for their page range
    /// (system temp dir when `None`).
    pub fn new(pipeline: Pipeline, store: SessionStore, upload_root: Option<PathBuf>) -> Self {
        Self {
            pipeline,
            store,
            upload_root,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Handle one event for `user_id` and return the replies, in order.
    #[instrument(skip(self, event), fields(user = %user_id, event = event.label()))]
    pub async fn handle(&self, user_id: UserId, event: Event) -> Vec<Reply> {
        let mut session = self.store.lock(user_id).await;
        session.touch();

        match event {
            Event::Start { display_name } => {
                vec![Reply::with_keyboard(messages::greeting(&display_name), Keyboard::Main)]
            }
            Event::Help => vec![Reply::with_keyboard(messages::HELP, Keyboard::Main)],
            Event::Menu => vec![Reply::with_keyboard(messages::MAIN_MENU, Keyboard::Main)],
            Event::Text(text) => self.on_text(&mut session, &text).await,
            Event::Callback(id) => on_callback(&mut session, &id),
            Event::File { file_name, bytes } => self.on_file(&mut session, &file_name, bytes).await,
        }
    }

    async fn on_text(&self, session: &mut Session, text: &str) -> Vec<Reply> {
        match MenuButton::from_label(text) {
            Some(MenuButton::Convert) => {
                vec![Reply::with_keyboard(messages::CHOOSE_CONVERSION, Keyboard::Convert)]
            }
            Some(MenuButton::PageSelection) => {
                session.begin(Operation::PageSelection);
                vec![Reply::text(messages::upload_prompt(Operation::PageSelection))]
            }
            Some(MenuButton::Transliterate) => vec![Reply::with_keyboard(
                messages::CHOOSE_TRANSLITERATION,
                Keyboard::Transliterate,
            )],
            None if session.has_pending_upload() => self.on_page_range(session, text).await,
            None => vec![Reply::with_keyboard(messages::PICK_FROM_MENU, Keyboard::Main)],
        }
    }

    async fn on_file(&self, session: &mut Session, file_name: &str, bytes: Vec<u8>) -> Vec<Reply> {
        // A second upload while the page range is pending replaces the first.
        let operation = match session.awaiting_file() {
            Some(op) => op,
            None if session.has_pending_upload() => Operation::PageSelection,
            None => {
                return vec![Reply::with_keyboard(messages::PICK_OPERATION_FIRST, Keyboard::Main)];
            }
        };

        let kind = match accepted_kind(operation, file_name, &bytes) {
            Ok(kind) => kind,
            Err(err) => {
                info!(%operation, file = file_name, "Rejected upload");
                return vec![Reply::with_keyboard(
                    humanize_error(&err).to_reply(),
                    keyboard_for(operation),
                )];
            }
        };

        if operation == Operation::PageSelection {
            return match StoredUpload::store(self.upload_root.as_deref(), file_name, kind, &bytes) {
                Ok(upload) => {
                    session.hold(upload);
                    vec![Reply::text(messages::PAGE_PROMPT)]
                }
                Err(err) => {
                    session.reset();
                    failure_replies(&err)
                }
            };
        }

        // Single-shot: the session is free again whatever the outcome.
        session.reset();
        let mut replies = vec![Reply::text(messages::PROCESSING)];
        match self.run(operation, &bytes, kind, file_name).await {
            Ok(output) => {
                replies.push(document(output, messages::result_caption(operation)));
                replies.push(Reply::with_keyboard(messages::CONVERSION_DONE, Keyboard::Main));
            }
            Err(err) => replies.extend(failure_replies(&err)),
        }
        replies
    }

    async fn on_page_range(&self, session: &mut Session, text: &str) -> Vec<Reply> {
        let pages = PageSet::parse(text);
        if pages.is_empty() {
            return vec![Reply::text(messages::PAGE_FORMAT_INVALID)];
        }
        let Some(upload) = session.take_upload() else {
            return failure_replies(&HujjatError::NoPendingArtifact);
        };

        let mut replies = vec![Reply::text(messages::extracting_pages(&pages))];
        let result = match upload.read() {
            Ok(bytes) => {
                self.pipeline
                    .select_pages(&bytes, upload.kind(), upload.file_name(), &pages)
                    .await
            }
            Err(err) => Err(err),
        };
        upload.release();

        match result {
            Ok(output) => {
                replies.push(document(output, messages::selected_pages_caption(&pages)));
                replies.push(Reply::with_keyboard(messages::PAGES_DONE, Keyboard::Main));
            }
            Err(err) => replies.extend(failure_replies(&err)),
        }
        replies
    }

    async fn run(
        &self,
        operation: Operation,
        input: &[u8],
        kind: DocumentKind,
        file_name: &str,
    ) -> Result<PipelineOutput> {
        match operation {
            Operation::PdfToWord => self.pipeline.pdf_to_word(input, file_name).await,
            Operation::WordToPdf => self.pipeline.word_to_pdf(input, kind, file_name).await,
            Operation::Transliterate(direction) => {
                self.pipeline
                    .transliterate(input, kind, file_name, direction)
                    .await
            }
            Operation::PageSelection => Err(HujjatError::NoPendingArtifact),
        }
    }
}

fn on_callback(session: &mut Session, id: &str) -> Vec<Reply> {
    if id == BACK_TO_MAIN {
        session.reset();
        return vec![Reply::with_keyboard(messages::WHAT_NEXT, Keyboard::Main)];
    }
    match Operation::from_callback(id) {
        Some(operation) => {
            session.begin(operation);
            vec![Reply::text(messages::upload_prompt(operation))]
        }
        None => {
            warn!(callback = id, "Unknown callback id");
            vec![Reply::with_keyboard(messages::PICK_FROM_MENU, Keyboard::Main)]
        }
    }
}

/// The document kind of an upload if `operation` takes it.
///
/// The extension must name an accepted kind. When the leading bytes say the
/// file is really something else, the content wins if the operation takes
/// that kind too; otherwise the upload is rejected.
fn accepted_kind(operation: Operation, file_name: &str, bytes: &[u8]) -> Result<DocumentKind> {
    let rejected = || HujjatError::InvalidFileType {
        file_name: file_name.to_string(),
        expected: operation.accepted_extensions(),
    };
    let named = DocumentKind::from_file_name(file_name)
        .filter(|kind| operation.accepts(*kind))
        .ok_or_else(rejected)?;

    match DocumentKind::sniff(bytes) {
        None => Ok(named),
        Some(sniffed) if sniffed == named => Ok(named),
        Some(sniffed) if operation.accepts(sniffed) => {
            info!(file = file_name, ?named, ?sniffed, "Extension does not match content, using content");
            Ok(sniffed)
        }
        Some(sniffed) => {
            info!(file = file_name, ?named, ?sniffed, "Content is not accepted here");
            Err(rejected())
        }
    }
}

/// Keyboard to show again after a rejected upload.
fn keyboard_for(operation: Operation) -> Keyboard {
    match operation {
        Operation::PdfToWord | Operation::WordToPdf => Keyboard::Convert,
        Operation::Transliterate(_) => Keyboard::Transliterate,
        Operation::PageSelection => Keyboard::Main,
    }
}

fn document(output: PipelineOutput, caption: String) -> Reply {
    Reply::Document {
        bytes: output.bytes,
        file_name: output.file_name,
        caption,
    }
}

fn failure_replies(err: &HujjatError) -> Vec<Reply> {
    match err.stage() {
        Some(stage) => error!(%stage, error = %err, "Operation failed"),
        None => warn!(error = %err, "Operation failed"),
    }
    vec![Reply::with_keyboard(humanize_error(err).to_reply(), Keyboard::Main)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;
    use async_trait::async_trait;
    use hujjat_core::{PaperSize, TransliterationDirection};
    use hujjat_document::convert::{BuiltinPdfRenderer, TextLayerConverter, WordToPdfConverter};
    use hujjat_document::{ConverterSet, PdfRenderer, WordDocument};
    use std::path::Path;
    use std::sync::Arc;

    const USER: UserId = UserId(42);

    struct Unavailable;

    #[async_trait]
    impl WordToPdfConverter for Unavailable {
        fn name(&self) -> &'static str {
            "unavailable"
        }

        async fn word_to_pdf(&self, _word: &[u8], _kind: DocumentKind) -> Result<Vec<u8>> {
            Err(HujjatError::ServiceUnavailable("HTTP 503".into()))
        }
    }

    fn machine_with(word_to_pdf: Arc<dyn WordToPdfConverter>, root: &Path) -> SessionMachine {
        let converters = ConverterSet::new(Arc::new(TextLayerConverter), word_to_pdf);
        let pipeline = Pipeline::new(converters, Some(root.join("scratch")));
        SessionMachine::new(pipeline, SessionStore::new(), Some(root.join("uploads")))
    }

    fn machine(root: &Path) -> SessionMachine {
        machine_with(Arc::new(BuiltinPdfRenderer::new(PaperSize::A4)), root)
    }

    fn pdf(pages: usize) -> Vec<u8> {
        let paragraphs: Vec<String> = (1..=pages).map(|n| format!("Bet {n}\u{c}")).collect();
        PdfRenderer::new(PaperSize::A4)
            .render_paragraphs(&paragraphs)
            .unwrap()
    }

    fn docx(text: &str) -> Vec<u8> {
        WordDocument::from_paragraphs([text.to_string()])
            .to_bytes()
            .unwrap()
    }

    fn file(name: &str, bytes: Vec<u8>) -> Event {
        Event::File {
            file_name: name.into(),
            bytes,
        }
    }

    fn texts(replies: &[Reply]) -> Vec<&str> {
        replies.iter().filter_map(Reply::as_text).collect()
    }

    fn documents(replies: &[Reply]) -> Vec<(&str, &str)> {
        replies
            .iter()
            .filter_map(|reply| match reply {
                Reply::Document {
                    file_name, caption, ..
                } => Some((file_name.as_str(), caption.as_str())),
                Reply::Text { .. } => None,
            })
            .collect()
    }

    async fn pending_path(machine: &SessionMachine) -> Option<PathBuf> {
        let session = machine.store().session(USER);
        let session = session.lock().await;
        match session.state() {
            SessionState::AwaitingPageRange(upload) => Some(upload.path().to_path_buf()),
            _ => None,
        }
    }

    fn dir_is_empty(path: &Path) -> bool {
        std::fs::read_dir(path).map_or(true, |mut entries| entries.next().is_none())
    }

    #[tokio::test]
    async fn start_greets_by_name_with_main_keyboard() {
        let root = tempfile::tempdir().unwrap();
        let replies = machine(root.path())
            .handle(USER, Event::Start { display_name: "Aziz".into() })
            .await;
        assert!(matches!(
            &replies[..],
            [Reply::Text { text, keyboard: Some(Keyboard::Main) }] if text.starts_with("Salom, Aziz!")
        ));
    }

    #[tokio::test]
    async fn file_without_operation_asks_to_pick_one() {
        let root = tempfile::tempdir().unwrap();
        let replies = machine(root.path()).handle(USER, file("a.pdf", pdf(1))).await;
        assert_eq!(texts(&replies), vec![messages::PICK_OPERATION_FIRST]);
    }

    #[tokio::test]
    async fn wrong_extension_keeps_waiting_for_a_file() {
        let root = tempfile::tempdir().unwrap();
        let machine = machine(root.path());
        machine.handle(USER, Event::Callback("pdf_to_word".into())).await;

        let replies = machine.handle(USER, file("notes.docx", docx("x"))).await;
        assert_eq!(texts(&replies), vec!["Iltimos, PDF faylni yuklang."]);
        let session = machine.store().session(USER);
        assert_eq!(session.lock().await.awaiting_file(), Some(Operation::PdfToWord));
    }

    #[tokio::test]
    async fn transliteration_is_single_shot() {
        let root = tempfile::tempdir().unwrap();
        let machine = machine(root.path());
        machine.handle(USER, Event::Callback("cyrillic_to_latin".into())).await;

        let replies = machine.handle(USER, file("xat.docx", docx("Салом"))).await;
        assert_eq!(replies.first().and_then(Reply::as_text), Some(messages::PROCESSING));
        assert_eq!(
            documents(&replies),
            vec![("xat_to_latin.docx", "Mana sizning Lotincha faylingiz!")]
        );
        assert_eq!(replies.last().and_then(Reply::as_text), Some(messages::CONVERSION_DONE));

        let session = machine.store().session(USER);
        assert!(matches!(session.lock().await.state(), SessionState::Idle));
    }

    #[tokio::test]
    async fn page_selection_flow() {
        let root = tempfile::tempdir().unwrap();
        let machine = machine(root.path());
        machine.handle(USER, Event::Text("📄 Betlash".into())).await;

        let replies = machine.handle(USER, file("kitob.pdf", pdf(4))).await;
        assert_eq!(texts(&replies), vec![messages::PAGE_PROMPT]);
        let path = pending_path(&machine).await.unwrap();
        assert!(path.exists());

        let replies = machine.handle(USER, Event::Text("2-3, 9".into())).await;
        assert_eq!(
            replies.first().and_then(Reply::as_text),
            Some("Quyidagi betlarni ajratyapman: 2, 3, 9")
        );
        assert_eq!(
            documents(&replies),
            vec![("kitob_selected_pages.pdf", "Tanlangan betlar: 2, 3, 9")]
        );
        assert!(!path.exists());
        assert!(pending_path(&machine).await.is_none());
    }

    #[tokio::test]
    async fn unparsable_range_reprompts_and_keeps_the_upload() {
        let root = tempfile::tempdir().unwrap();
        let machine = machine(root.path());
        machine.handle(USER, Event::Callback("page_selection".into())).await;
        machine.handle(USER, file("kitob.pdf", pdf(2))).await;

        let replies = machine.handle(USER, Event::Text("abc, 5-1".into())).await;
        assert_eq!(texts(&replies), vec![messages::PAGE_FORMAT_INVALID]);
        assert!(pending_path(&machine).await.unwrap().exists());

        let replies = machine.handle(USER, Event::Text("1".into())).await;
        assert_eq!(documents(&replies).len(), 1);
    }

    #[tokio::test]
    async fn missing_pages_report_the_count_and_release_the_upload() {
        let root = tempfile::tempdir().unwrap();
        let machine = machine(root.path());
        machine.handle(USER, Event::Callback("page_selection".into())).await;
        machine.handle(USER, file("kitob.pdf", pdf(3))).await;
        let path = pending_path(&machine).await.unwrap();

        let replies = machine.handle(USER, Event::Text("5".into())).await;
        assert!(documents(&replies).is_empty());
        let last = replies.last().and_then(Reply::as_text).unwrap();
        assert!(last.contains("3 betdan"), "got: {last}");
        assert!(!path.exists());
        let session = machine.store().session(USER);
        assert!(matches!(session.lock().await.state(), SessionState::Idle));
    }

    #[tokio::test]
    async fn second_upload_then_cancel_leaves_nothing_behind() {
        let root = tempfile::tempdir().unwrap();
        let machine = machine(root.path());
        machine.handle(USER, Event::Callback("page_selection".into())).await;

        machine.handle(USER, file("birinchi.pdf", pdf(2))).await;
        let first = pending_path(&machine).await.unwrap();
        machine.handle(USER, file("ikkinchi.docx", docx("Salom"))).await;
        let second = pending_path(&machine).await.unwrap();
        assert!(!first.exists());
        assert!(second.exists());

        let replies = machine.handle(USER, Event::Callback(BACK_TO_MAIN.into())).await;
        assert_eq!(texts(&replies), vec![messages::WHAT_NEXT]);
        assert!(!second.exists());
        assert!(dir_is_empty(&root.path().join("uploads")));
    }

    #[tokio::test]
    async fn new_operation_releases_the_pending_upload() {
        let root = tempfile::tempdir().unwrap();
        let machine = machine(root.path());
        machine.handle(USER, Event::Callback("page_selection".into())).await;
        machine.handle(USER, file("kitob.pdf", pdf(1))).await;
        let path = pending_path(&machine).await.unwrap();

        machine.handle(USER, Event::Callback("latin_to_cyrillic".into())).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn service_failure_resets_to_idle_with_a_message() {
        let root = tempfile::tempdir().unwrap();
        let machine = machine_with(Arc::new(Unavailable), root.path());
        machine.handle(USER, Event::Callback("word_to_pdf".into())).await;

        let replies = machine.handle(USER, file("xat.docx", docx("Salom"))).await;
        assert!(documents(&replies).is_empty());
        assert!(matches!(
            replies.last(),
            Some(Reply::Text { keyboard: Some(Keyboard::Main), text }) if text.contains("HTTP 503")
        ));
        let session = machine.store().session(USER);
        assert!(matches!(session.lock().await.state(), SessionState::Idle));
        assert!(dir_is_empty(&root.path().join("scratch")));
    }

    #[tokio::test]
    async fn legacy_doc_is_only_for_word_to_pdf() {
        let root = tempfile::tempdir().unwrap();
        let machine = machine(root.path());
        machine.handle(
            USER,
            Event::Callback(
                Operation::Transliterate(TransliterationDirection::ToLatin)
                    .callback_id()
                    .into(),
            ),
        )
        .await;
        let replies = machine.handle(USER, file("eski.doc", vec![0xD0, 0xCF])).await;
        assert_eq!(texts(&replies), vec!["Iltimos, PDF/DOCX faylni yuklang."]);
    }

    #[tokio::test]
    async fn content_decides_when_the_operation_takes_it() {
        let root = tempfile::tempdir().unwrap();
        let machine = machine(root.path());
        machine.handle(USER, Event::Callback("cyrillic_to_latin".into())).await;

        let replies = machine.handle(USER, file("xat.pdf", docx("Салом"))).await;
        assert_eq!(documents(&replies), vec![("xat_to_latin.docx", "Mana sizning Lotincha faylingiz!")]);
        let Some(Reply::Document { bytes, .. }) = replies.get(1) else {
            panic!("expected a document, got {replies:?}");
        };
        let word = WordDocument::from_bytes(bytes).unwrap();
        assert_eq!(word.plain_paragraphs(), vec!["Salom"]);
    }

    #[tokio::test]
    async fn content_the_operation_rejects_keeps_waiting() {
        let root = tempfile::tempdir().unwrap();
        let machine = machine(root.path());
        machine.handle(USER, Event::Callback("pdf_to_word".into())).await;

        let replies = machine.handle(USER, file("hisobot.pdf", docx("Salom"))).await;
        assert!(documents(&replies).is_empty());
        assert_eq!(texts(&replies), vec!["Iltimos, PDF faylni yuklang."]);
        let session = machine.store().session(USER);
        assert_eq!(session.lock().await.awaiting_file(), Some(Operation::PdfToWord));
    }

    #[test]
    fn sniffing_only_overrides_accepted_kinds() {
        let pdf_bytes = b"%PDF-1.7".as_slice();
        let zip_bytes = [0x50, 0x4B, 0x03, 0x04].as_slice();
        let ole_bytes = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1].as_slice();
        let translit = Operation::Transliterate(TransliterationDirection::ToCyrillic);

        assert_eq!(accepted_kind(translit, "a.docx", pdf_bytes).unwrap(), DocumentKind::Pdf);
        assert_eq!(
            accepted_kind(Operation::WordToPdf, "a.docx", ole_bytes).unwrap(),
            DocumentKind::LegacyWord
        );
        assert_eq!(accepted_kind(Operation::PdfToWord, "a.pdf", b"??").unwrap(), DocumentKind::Pdf);
        assert!(accepted_kind(Operation::PdfToWord, "a.pdf", zip_bytes).is_err());
        assert!(accepted_kind(translit, "a.pdf", ole_bytes).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_uploads_for_one_user_leave_one_pending() {
        let root = tempfile::tempdir().unwrap();
        let machine = machine(root.path());
        machine.handle(USER, Event::Callback("page_selection".into())).await;

        let (first, second) = tokio::join!(
            machine.handle(USER, file("birinchi.pdf", pdf(2))),
            machine.handle(USER, file("ikkinchi.pdf", pdf(3))),
        );
        assert_eq!(texts(&first), vec![messages::PAGE_PROMPT]);
        assert_eq!(texts(&second), vec![messages::PAGE_PROMPT]);

        let pending = pending_path(&machine).await.unwrap();
        assert!(pending.exists());
        let stored: Vec<_> = std::fs::read_dir(root.path().join("uploads"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(stored, vec![pending]);
    }

    #[tokio::test]
    async fn users_do_not_share_state() {
        let root = tempfile::tempdir().unwrap();
        let machine = machine(root.path());
        machine.handle(UserId(1), Event::Callback("pdf_to_word".into())).await;
        let replies = machine.handle(UserId(2), file("a.pdf", pdf(1))).await;
        assert_eq!(texts(&replies), vec![messages::PICK_OPERATION_FIRST]);
        assert_eq!(machine.store().len(), 2);
    }
}
