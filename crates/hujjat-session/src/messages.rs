// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Uzbek texts the bot sends.

use hujjat_core::{Operation, TransliterationDirection};

pub const HELP: &str = "Men quyidagi ishlarni bajarishda yordam beraman:\n\n\
    1. PDF fayllarni Word hujjatlariga o'zgartirish\n\
    2. Word hujjatlarini PDF fayllariga o'zgartirish\n\
    3. PDF yoki Word fayllardan belgilangan betlarni ajratib olish\n\
    4. Fayllarni Kril va Lotin alifbosida almashtirish\n\n\
    Quyidagi menyudan variantni tanlang:";

pub const MAIN_MENU: &str = "Asosiy menyu:\n\nQuyidagi variantlardan birini tanlang:";
pub const CHOOSE_CONVERSION: &str = "O'zgartirish turini tanlang:";
pub const CHOOSE_TRANSLITERATION: &str = "Almashtirish turini tanlang:";
pub const WHAT_NEXT: &str = "Nima qilmoqchisiz?";
pub const PICK_FROM_MENU: &str = "Iltimos, menyudan variantni tanlang:";
pub const PICK_OPERATION_FIRST: &str =
    "Iltimos, avval asosiy menyudan nima qilmoqchi ekanligingizni tanlang.";

pub const PROCESSING: &str = "Faylingiz qayta ishlanmoqda, iltimos kuting...";
pub const CONVERSION_DONE: &str = "O'zgartirish tugallandi! Yana nima qilmoqchisiz?";

pub const PAGE_PROMPT: &str =
    "Betlarni kiriting. Misol uchun: 1-5, 7, 10-12\n\nQaysi betlarni ajratib olishni istaysiz?";
pub const PAGE_FORMAT_INVALID: &str = "Noto'g'ri format. Misol uchun: 1-5, 7, 10-12";
pub const PAGES_DONE: &str = "Betlarni ajratish tugallandi! Yana nima qilmoqchisiz?";

pub fn greeting(display_name: &str) -> String {
    format!(
        "Salom, {display_name}! 👋\n\n\
         Men PDF va Word formatlarini o'zgartirishda yordam beraman.\n\n\
         Quyidagi variantlardan birini tanlang:"
    )
}

/// Asks for the file an operation needs.
pub fn upload_prompt(operation: Operation) -> &'static str {
    match operation {
        Operation::PdfToWord => {
            "Iltimos, Word formatiga o'zgartirmoqchi bo'lgan PDF faylni yuklang."
        }
        Operation::WordToPdf => {
            "Iltimos, PDF formatiga o'zgartirmoqchi bo'lgan Word hujjatini (DOCX/DOC) yuklang."
        }
        Operation::PageSelection => {
            "Iltimos, betlarni ajratib olmoqchi bo'lgan PDF yoki Word faylni yuklang."
        }
        Operation::Transliterate(TransliterationDirection::ToLatin) => {
            "Iltimos, Kirildan Lotinga o'zgartirmoqchi bo'lgan PDF yoki Word faylni yuklang."
        }
        Operation::Transliterate(TransliterationDirection::ToCyrillic) => {
            "Iltimos, Lotindan Kirilga o'zgartirmoqchi bo'lgan PDF yoki Word faylni yuklang."
        }
    }
}

/// Caption on a finished single-shot result.
pub fn result_caption(operation: Operation) -> String {
    match operation {
        Operation::PdfToWord => "Mana sizning Word hujjatingiz!".into(),
        Operation::WordToPdf => "Mana sizning PDF faylingiz!".into(),
        Operation::Transliterate(TransliterationDirection::ToLatin) => {
            "Mana sizning Lotincha faylingiz!".into()
        }
        Operation::Transliterate(TransliterationDirection::ToCyrillic) => {
            "Mana sizning Kirilcha faylingiz!".into()
        }
        Operation::PageSelection => "Tanlangan betlar".into(),
    }
}

pub fn extracting_pages(pages: &impl std::fmt::Display) -> String {
    format!("Quyidagi betlarni ajratyapman: {pages}")
}

pub fn selected_pages_caption(pages: &impl std::fmt::Display) -> String {
    format!("Tanlangan betlar: {pages}")
}
