// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages shown to the end user.
//
// The bot talks to its users in Uzbek, so every technical error is mapped to
// an Uzbek sentence plus a short suggestion. Technical detail is appended in
// parentheses where it helps the user (e.g. the converter's own message).

use crate::error::HujjatError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Remote service blip; trying again later may work.
    Transient,
    /// User must do something (send another file, fix the page list).
    ActionRequired,
    /// The file itself cannot be processed.
    Permanent,
}

/// A human-readable error with a message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
}

impl HumanError {
    /// Message and suggestion joined for a single chat reply.
    pub fn to_reply(&self) -> String {
        if self.suggestion.is_empty() {
            self.message.clone()
        } else {
            format!("{}\n{}", self.message, self.suggestion)
        }
    }
}

/// Convert a `HujjatError` into a `HumanError`.
pub fn humanize_error(err: &HujjatError) -> HumanError {
    match err {
        HujjatError::NoValidPages { total_pages } => HumanError {
            message: format!(
                "Tanlangan betlar mavjud emas. Fayl {total_pages} betdan iborat."
            ),
            suggestion: "Iltimos, mavjud bet raqamlarini kiriting.".into(),
            severity: Severity::ActionRequired,
        },

        HujjatError::Conversion { source, .. } => match source.as_ref() {
            HujjatError::ServiceUnavailable(_) => humanize_error(source),
            HujjatError::UnsupportedDocument(_) => humanize_error(source),
            other => HumanError {
                message: "Kechirasiz, faylni qayta ishlashda xatolik yuz berdi.".into(),
                suggestion: format!("Fayl buzilgan bo'lishi mumkin. ({other})"),
                severity: Severity::Permanent,
            },
        },

        HujjatError::ServiceUnavailable(detail) => HumanError {
            message: "Cloud konvertatsiya xizmatida xatolik.".into(),
            suggestion: format!("Birozdan so'ng qayta urinib ko'ring. ({detail})"),
            severity: Severity::Transient,
        },

        HujjatError::InvalidFileType { expected, .. } => HumanError {
            message: format!("Iltimos, {expected} faylni yuklang."),
            suggestion: String::new(),
            severity: Severity::ActionRequired,
        },

        HujjatError::UnsupportedDocument(detail) => HumanError {
            message: "Bu turdagi fayl qo'llab-quvvatlanmaydi.".into(),
            suggestion: format!("Faylni DOCX yoki PDF sifatida saqlab, qayta yuboring. ({detail})"),
            severity: Severity::Permanent,
        },

        HujjatError::Pdf(_) => HumanError {
            message: "PDF faylda muammo bor.".into(),
            suggestion: "Fayl buzilgan bo'lishi mumkin. Boshqa faylni sinab ko'ring.".into(),
            severity: Severity::Permanent,
        },

        HujjatError::Docx(_) => HumanError {
            message: "Word hujjatida muammo bor.".into(),
            suggestion: "Fayl buzilgan bo'lishi mumkin. Boshqa faylni sinab ko'ring.".into(),
            severity: Severity::Permanent,
        },

        HujjatError::Converter(detail) => HumanError {
            message: "Konvertatsiya jarayonida xatolik yuz berdi.".into(),
            suggestion: format!("Qayta urinib ko'ring. ({detail})"),
            severity: Severity::Transient,
        },

        HujjatError::NoPendingArtifact => HumanError {
            message: "Fayl topilmadi.".into(),
            suggestion: "Iltimos, faylni qaytadan yuboring.".into(),
            severity: Severity::ActionRequired,
        },

        HujjatError::Config(_) | HujjatError::Io(_) | HujjatError::Serialization(_) => {
            HumanError {
                message: "Kechirasiz, ichki xatolik yuz berdi.".into(),
                suggestion: "Qayta urinib ko'ring.".into(),
                severity: Severity::Transient,
            }
        }
    }
}
