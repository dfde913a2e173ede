//! Step labels emitted by the document-processing backend.
//!
//! The server sends human-readable labels rather than stage codes. Every
//! string the crate matches against lives here and in the stage table.

/// Marks an event as a failure when contained in its label.
pub const ERROR_MARKER: &str = "Hata";

/// Contained in every completion label, stage-level or run-level.
pub const COMPLETION_MARKER: &str = "Tamamlandı";

/// Contained in labels announcing the start of a step.
pub const STARTED_MARKER: &str = "Başlatıldı";

/// Contained in labels announcing the start of a step (alternate form).
pub const BEGINNING_MARKER: &str = "Başlangıç";

/// Synthetic label for `processing_complete` messages.
pub const RUN_COMPLETED: &str = "İşlem Tamamlandı";

/// Synthetic label for `processing_error` messages.
pub const RUN_FAILED: &str = "Hata Oluştu";

/// Synthetic label for `document_uploaded` messages.
pub const DOCUMENT_UPLOADED: &str = "Belge Yüklendi";

/// Result recorded when a completion message carries no decision.
pub const DEFAULT_RESULT: &str = "Başarılı";

/// Label fragments used to classify raw log entries by topic.
pub mod topics {
    /// File handling.
    pub const FILE: &str = "Dosya";
    /// Upload acknowledgement.
    pub const UPLOADED: &str = "Yüklendi";
    /// Text recognition.
    pub const OCR: &str = "OCR";
    /// Language analysis.
    pub const NLP: &str = "NLP";
    /// Analysis (alternate form).
    pub const ANALYSIS: &str = "Analiz";
    /// Decision making.
    pub const DECISION: &str = "Karar";
}

/// Step labels the backend sends during a document run.
pub mod steps {
    /// Run accepted by the backend.
    pub const RUN_STARTED: &str = "İşlem Başlatıldı";
    /// File content read.
    pub const FILE_READ: &str = "Dosya Okundu";
    /// File type validated.
    pub const FILE_TYPE_CHECKED: &str = "Dosya Tipi Kontrolü";
    /// Document row persisted.
    pub const DATABASE_RECORD: &str = "Veritabanı Kaydı";
    /// Text recognition started.
    pub const OCR_STARTED: &str = "OCR İşlemi Başlatıldı";
    /// Text recognition finished.
    pub const OCR_COMPLETED: &str = "OCR Tamamlandı";
    /// Language analysis started.
    pub const NLP_STARTED: &str = "NLP Analizi Başlatıldı";
    /// Language analysis finished.
    pub const NLP_COMPLETED: &str = "NLP Analizi Tamamlandı";
    /// Decision rules started.
    pub const DECISION_STARTED: &str = "Karar Verme Başlatıldı";
    /// Decision rules finished.
    pub const DECISION_COMPLETED: &str = "Karar Verme Tamamlandı";
}
