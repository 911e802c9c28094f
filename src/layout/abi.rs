// Tue Jan 20 2026 - Alex

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target pointer model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerWidth {
    Bits32,
    Bits64,
}

impl PointerWidth {
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            32 => Some(Self::Bits32),
            64 => Some(Self::Bits64),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            Self::Bits32 => 32,
            Self::Bits64 => 64,
        }
    }

    pub fn bytes(self) -> u64 {
        match self {
            Self::Bits32 => 4,
            Self::Bits64 => 8,
        }
    }
}

impl fmt::Display for PointerWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Type widths keyed by canonical uppercase name, plus the pointer width they assume.
///
/// Built once before a resolution pass and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiProfile {
    pointer_width: PointerWidth,
    widths: IndexMap<String, u64>,
    /// Entries added by the caller; these win over the pointer naming convention.
    overrides: IndexMap<String, u64>,
    unicode: bool,
}

impl AbiProfile {
    pub fn new(pointer_width: PointerWidth) -> Self {
        let pick = |&(name, w32, w64): &(&str, u64, u64)| {
            let width = match pointer_width {
                PointerWidth::Bits32 => w32,
                PointerWidth::Bits64 => w64,
            };
            (name.to_string(), width)
        };

        let widths = WINDOWS_TYPES.iter().chain(C_TYPES.iter()).map(pick).collect();

        Self {
            pointer_width,
            widths,
            overrides: IndexMap::new(),
            unicode: true,
        }
    }

    pub fn x86() -> Self {
        Self::new(PointerWidth::Bits32)
    }

    pub fn x64() -> Self {
        Self::new(PointerWidth::Bits64)
    }

    /// `TCHAR`/`TBYTE` are `WCHAR`-sized in Unicode builds and `CHAR`-sized otherwise.
    pub fn with_unicode(mut self, unicode: bool) -> Self {
        let width = if unicode { 2 } else { 1 };
        for alias in TEXT_ALIASES {
            self.widths.insert(alias.to_string(), width);
        }
        self.unicode = unicode;
        self
    }

    pub fn with_width(mut self, name: &str, width: u64) -> Self {
        let name = canonical_name(name);
        self.widths.insert(name.clone(), width);
        self.overrides.insert(name, width);
        self
    }

    pub fn with_widths<'a, I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a u64)>,
    {
        for (name, width) in entries {
            let name = canonical_name(name);
            self.widths.insert(name.clone(), *width);
            self.overrides.insert(name, *width);
        }
        self
    }

    pub fn pointer(&self) -> PointerWidth {
        self.pointer_width
    }

    pub fn pointer_width(&self) -> u64 {
        self.pointer_width.bytes()
    }

    pub fn is_unicode(&self) -> bool {
        self.unicode
    }

    /// Case-insensitive width lookup
    pub fn width_of_name(&self, name: &str) -> Option<u64> {
        self.widths.get(&canonical_name(name)).copied()
    }

    /// Width the caller set explicitly through [`AbiProfile::with_width`] or `with_widths`.
    pub fn override_of(&self, name: &str) -> Option<u64> {
        self.overrides.get(&canonical_name(name)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.widths.contains_key(&canonical_name(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.widths.iter().map(|(name, width)| (name.as_str(), *width))
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}

impl Default for AbiProfile {
    fn default() -> Self {
        Self::x64()
    }
}

/// Uppercase with runs of whitespace collapsed, so `unsigned  int` finds `UNSIGNED INT`.
pub fn canonical_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

const TEXT_ALIASES: [&str; 2] = ["TCHAR", "TBYTE"];

// (name, 32-bit width, 64-bit width)
const WINDOWS_TYPES: &[(&str, u64, u64)] = &[
    ("LARGE_INTEGER", 8, 8),
    ("ULARGE_INTEGER", 8, 8),
    ("CSHORT", 2, 2),
    ("ATOM", 2, 2),
    ("BOOL", 4, 1),
    ("BOOLEAN", 1, 1),
    ("BYTE", 1, 1),
    ("CCHAR", 1, 1),
    ("CHAR", 1, 1),
    ("COLORREF", 4, 4),
    ("DWORD", 4, 4),
    ("DWORDLONG", 8, 8),
    ("DWORD_PTR", 4, 8),
    ("DWORD32", 4, 4),
    ("DWORD64", 8, 8),
    ("FLOAT", 4, 4),
    ("HACCEL", 4, 8),
    ("HALF_PTR", 2, 8),
    ("HANDLE", 4, 8),
    ("HBITMAP", 4, 8),
    ("HBRUSH", 4, 8),
    ("HCOLORSPACE", 4, 8),
    ("HCONV", 4, 8),
    ("HCONVLIST", 4, 8),
    ("HCURSOR", 4, 8),
    ("HDC", 4, 8),
    ("HDDEDATA", 4, 8),
    ("HDESK", 4, 8),
    ("HDROP", 4, 8),
    ("HDWP", 4, 8),
    ("HENHMETAFILE", 4, 8),
    ("HFILE", 4, 8),
    ("HFONT", 4, 8),
    ("HGDIOBJ", 4, 8),
    ("HGLOBAL", 4, 8),
    ("HHOOK", 4, 8),
    ("HICON", 4, 8),
    ("HINSTANCE", 4, 8),
    ("HKEY", 4, 8),
    ("HKL", 4, 8),
    ("HLOCAL", 4, 8),
    ("HMENU", 4, 8),
    ("HMETAFILE", 4, 8),
    ("HMODULE", 4, 8),
    ("HMONITOR", 4, 8),
    ("HPALETTE", 4, 8),
    ("HPEN", 4, 8),
    ("HRESULT", 4, 8),
    ("HRGN", 4, 8),
    ("HRSRC", 4, 8),
    ("HSZ", 4, 8),
    ("HWINSTA", 4, 8),
    ("HWND", 4, 8),
    ("INT", 4, 4),
    ("INT_PTR", 4, 8),
    ("INT8", 1, 1),
    ("INT16", 2, 2),
    ("INT32", 4, 4),
    ("INT64", 8, 8),
    ("LANGID", 2, 2),
    ("LCID", 4, 4),
    ("LCTYPE", 4, 4),
    ("LGRPID", 4, 4),
    ("LONG", 4, 4),
    ("LONGLONG", 8, 8),
    ("LONG_PTR", 4, 8),
    ("LONG32", 4, 4),
    ("LONG64", 8, 8),
    ("LPARAM", 4, 8),
    ("LPBOOL", 4, 8),
    ("LPBYTE", 4, 8),
    ("LPCOLORREF", 4, 8),
    ("LPCSTR", 4, 8),
    ("LPCTSTR", 4, 8),
    ("LPCVOID", 4, 8),
    ("LPCWSTR", 4, 8),
    ("LPDWORD", 4, 8),
    ("LPHANDLE", 4, 8),
    ("LPINT", 4, 8),
    ("LPLONG", 4, 8),
    ("LPSTR", 4, 8),
    ("LPTSTR", 4, 8),
    ("LPVOID", 4, 8),
    ("LPWORD", 4, 8),
    ("LPWSTR", 4, 8),
    ("LRESULT", 4, 8),
    ("PBOOL", 4, 8),
    ("PBOOLEAN", 4, 8),
    ("PBYTE", 4, 8),
    ("PCHAR", 4, 8),
    ("PCSTR", 4, 8),
    ("PCTSTR", 4, 8),
    ("PCWSTR", 4, 8),
    ("PDWORD", 4, 8),
    ("PDWORDLONG", 4, 8),
    ("PDWORD_PTR", 4, 8),
    ("PDWORD32", 4, 8),
    ("PDWORD64", 4, 8),
    ("PFLOAT", 4, 8),
    ("PHALF_PTR", 4, 8),
    ("PHANDLE", 4, 8),
    ("PHKEY", 4, 8),
    ("PINT", 4, 8),
    ("PINT_PTR", 4, 8),
    ("PINT8", 4, 8),
    ("PINT16", 4, 8),
    ("PINT32", 4, 8),
    ("PINT64", 4, 8),
    ("PLCID", 4, 8),
    ("PLONG", 4, 8),
    ("PLONGLONG", 4, 8),
    ("PLONG_PTR", 4, 8),
    ("PLONG32", 4, 8),
    ("PLONG64", 4, 8),
    ("POINTER_32", 4, 4),
    ("POINTER_64", 4, 8),
    ("POINTER_SIGNED", 4, 8),
    ("POINTER_UNSIGNED", 4, 8),
    ("PSHORT", 4, 8),
    ("PSIZE_T", 4, 8),
    ("PSSIZE_T", 4, 8),
    ("PSTR", 4, 8),
    ("PTBYTE", 4, 8),
    ("PTCHAR", 4, 8),
    ("PTSTR", 4, 8),
    ("PUCHAR", 4, 8),
    ("PUHALF_PTR", 4, 8),
    ("PUINT", 4, 8),
    ("PUINT_PTR", 4, 8),
    ("PUINT8", 4, 8),
    ("PUINT16", 4, 8),
    ("PUINT32", 4, 8),
    ("PUINT64", 4, 8),
    ("PULONG", 4, 8),
    ("PULONGLONG", 4, 8),
    ("PULONG_PTR", 4, 8),
    ("PULONG32", 4, 8),
    ("PULONG64", 4, 8),
    ("PUSHORT", 4, 8),
    ("PVOID", 4, 8),
    ("PWCHAR", 4, 8),
    ("PWORD", 4, 8),
    ("PWSTR", 4, 8),
    ("QWORD", 8, 8),
    ("SC_HANDLE", 4, 8),
    ("SC_LOCK", 4, 8),
    ("SERVICE_STATUS_HANDLE", 4, 8),
    ("SHORT", 2, 2),
    ("SIZE_T", 4, 8),
    ("SSIZE_T", 4, 8),
    ("TBYTE", 2, 2),
    ("TCHAR", 2, 2),
    ("UCHAR", 1, 1),
    ("UHALF_PTR", 2, 4),
    ("UINT", 4, 4),
    ("UINT_PTR", 4, 8),
    ("UINT8", 1, 1),
    ("UINT16", 2, 2),
    ("UINT32", 4, 4),
    ("UINT64", 8, 8),
    ("ULONG", 4, 4),
    ("ULONGLONG", 8, 8),
    ("ULONG_PTR", 4, 8),
    ("ULONG32", 4, 4),
    ("ULONG64", 8, 8),
    ("UNICODE_STRING", 4, 12),
    ("USHORT", 2, 2),
    ("USN", 8, 8),
    ("WCHAR", 2, 2),
    ("WORD", 2, 2),
    ("WPARAM", 4, 8),
];

const C_TYPES: &[(&str, u64, u64)] = &[
    ("VOID", 0, 0),
    ("_BOOL", 1, 1),
    ("SIGNED CHAR", 1, 1),
    ("UNSIGNED CHAR", 1, 1),
    ("UNSIGNED SHORT", 2, 2),
    ("SHORT INT", 2, 2),
    ("UNSIGNED", 4, 4),
    ("SIGNED", 4, 4),
    ("UNSIGNED INT", 4, 4),
    ("SIGNED INT", 4, 4),
    ("UNSIGNED LONG", 4, 4),
    ("LONG INT", 4, 4),
    ("LONG LONG", 8, 8),
    ("UNSIGNED LONG LONG", 8, 8),
    ("__INT8", 1, 1),
    ("__INT16", 2, 2),
    ("__INT32", 4, 4),
    ("__INT64", 8, 8),
    ("DOUBLE", 8, 8),
    ("WCHAR_T", 2, 2),
    ("INT8_T", 1, 1),
    ("UINT8_T", 1, 1),
    ("INT16_T", 2, 2),
    ("UINT16_T", 2, 2),
    ("INT32_T", 4, 4),
    ("UINT32_T", 4, 4),
    ("INT64_T", 8, 8),
    ("UINT64_T", 8, 8),
    ("UINTPTR_T", 4, 8),
    ("INTPTR_T", 4, 8),
    ("PTRDIFF_T", 4, 8),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles() {
        let x86 = AbiProfile::x86();
        let x64 = AbiProfile::x64();

        assert_eq!(x86.pointer_width(), 4);
        assert_eq!(x64.pointer_width(), 8);
        assert_eq!(x86.width_of_name("INT"), Some(4));
        assert_eq!(x64.width_of_name("SIZE_T"), Some(8));
        assert_eq!(x86.width_of_name("SIZE_T"), Some(4));
        assert_eq!(x64.width_of_name("UNICODE_STRING"), Some(12));
    }

    #[test]
    fn test_lookup_is_case_and_space_insensitive() {
        let profile = AbiProfile::x64();
        assert_eq!(profile.width_of_name("ulong"), Some(4));
        assert_eq!(profile.width_of_name("unsigned   long  long"), Some(8));
        assert!(profile.contains("Handle"));
        assert!(!profile.contains("DRIVER_OBJECT"));
    }

    #[test]
    fn test_unicode_override() {
        let wide = AbiProfile::x64().with_unicode(true);
        let narrow = AbiProfile::x64().with_unicode(false);

        assert_eq!(wide.width_of_name("TCHAR"), Some(2));
        assert_eq!(wide.width_of_name("TBYTE"), Some(2));
        assert_eq!(narrow.width_of_name("TCHAR"), Some(1));
        assert_eq!(narrow.width_of_name("TBYTE"), Some(1));
        assert!(!narrow.is_unicode());
        // WCHAR never depends on the mode
        assert_eq!(narrow.width_of_name("WCHAR"), Some(2));
    }

    #[test]
    fn test_custom_widths() {
        let profile = AbiProfile::x86().with_width("list_entry", 8);
        assert_eq!(profile.width_of_name("LIST_ENTRY"), Some(8));
        assert_eq!(profile.override_of("LIST_ENTRY"), Some(8));
        // built-in entries are not overrides
        assert_eq!(profile.override_of("INT"), None);
    }

    #[test]
    fn test_pointer_width_from_bits() {
        assert_eq!(PointerWidth::from_bits(32), Some(PointerWidth::Bits32));
        assert_eq!(PointerWidth::from_bits(64).map(PointerWidth::bytes), Some(8));
        assert_eq!(PointerWidth::from_bits(16), None);
        assert_eq!(PointerWidth::Bits64.to_string(), "64-bit");
    }
}
