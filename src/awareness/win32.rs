// ── Win32 DPI entry points ────────────────────────────────────────────────────
//
// The only module in the crate where `unsafe` is permitted. Exports present on
// every supported Windows build (GetDC, GetDeviceCaps, IsProcessDPIAware and
// friends) are called through the `windows` bindings directly. Exports that
// appeared in later builds are resolved at runtime with GetProcAddress so that a
// binary built against the newest SDK still loads on older systems: an absent
// export becomes an `Option::None`, which the controller treats as
// "unsupported at this level".
//
// Each `unsafe` block carries a `// SAFETY:` comment.

#![allow(unsafe_code)]

use windows::Win32::Foundation::{BOOL, HANDLE, HMODULE, HWND, NTSTATUS};
use windows::Win32::Graphics::Gdi::{GetDC, GetDeviceCaps, HDC, LOGPIXELSX, ReleaseDC};
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
use windows::Win32::System::SystemInformation::OSVERSIONINFOW;
use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE,
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, DPI_AWARENESS_CONTEXT_SYSTEM_AWARE,
    DPI_AWARENESS_CONTEXT_UNAWARE, DPI_AWARENESS_CONTEXT_UNAWARE_GDISCALED,
    PROCESS_DPI_AWARENESS, PROCESS_DPI_UNAWARE, PROCESS_PER_MONITOR_DPI_AWARE,
    PROCESS_SYSTEM_DPI_AWARE,
};
use windows::Win32::UI::WindowsAndMessaging::{IsProcessDPIAware, SetProcessDPIAware};
use windows::core::{HRESULT, PCSTR, PCWSTR, s, w};

use super::host::HostApi;
use super::probe::OsVersion;
use super::tier::{AwarenessContext, ProcessAwareness};

type RtlGetVersionFn = unsafe extern "system" fn(*mut OSVERSIONINFOW) -> NTSTATUS;
type GetDpiForSystemFn = unsafe extern "system" fn() -> u32;
type GetProcessDpiAwarenessFn =
    unsafe extern "system" fn(HANDLE, *mut PROCESS_DPI_AWARENESS) -> HRESULT;
type SetProcessDpiAwarenessFn = unsafe extern "system" fn(PROCESS_DPI_AWARENESS) -> HRESULT;
type SetProcessDpiAwarenessContextFn = unsafe extern "system" fn(DPI_AWARENESS_CONTEXT) -> BOOL;
type GetThreadDpiAwarenessContextFn = unsafe extern "system" fn() -> DPI_AWARENESS_CONTEXT;
type SetThreadDpiAwarenessContextFn =
    unsafe extern "system" fn(DPI_AWARENESS_CONTEXT) -> DPI_AWARENESS_CONTEXT;
type AreDpiAwarenessContextsEqualFn =
    unsafe extern "system" fn(DPI_AWARENESS_CONTEXT, DPI_AWARENESS_CONTEXT) -> BOOL;

/// Win32 DPI surface. Version-gated exports are resolved once; modules are
/// never unloaded.
pub struct Win32Host {
    rtl_get_version: Option<RtlGetVersionFn>,
    get_dpi_for_system: Option<GetDpiForSystemFn>,
    get_process_dpi_awareness: Option<GetProcessDpiAwarenessFn>,
    set_process_dpi_awareness: Option<SetProcessDpiAwarenessFn>,
    set_process_dpi_awareness_context: Option<SetProcessDpiAwarenessContextFn>,
    get_thread_dpi_awareness_context: Option<GetThreadDpiAwarenessContextFn>,
    set_thread_dpi_awareness_context: Option<SetThreadDpiAwarenessContextFn>,
    are_dpi_awareness_contexts_equal: Option<AreDpiAwarenessContextsEqualFn>,
}

fn load_module(name: PCWSTR) -> Option<HMODULE> {
    // SAFETY: `name` is a static NUL-terminated wide string from `w!`.
    unsafe { LoadLibraryW(name) }.ok()
}

/// Resolve `name` in `module` as a function pointer of type `F`.
///
/// # Safety
/// `F` must be an `extern "system"` function pointer type whose signature
/// matches the export.
unsafe fn resolve<F: Copy>(module: Option<HMODULE>, name: PCSTR) -> Option<F> {
    debug_assert_eq!(std::mem::size_of::<F>(), std::mem::size_of::<usize>());
    let module = module?;
    // SAFETY: `module` was returned by LoadLibraryW and is never freed;
    // `name` is a static NUL-terminated string from `s!`.
    let proc = unsafe { GetProcAddress(module, name) }?;
    // SAFETY: caller guarantees `F` matches the export's signature; both are
    // pointer-sized function pointers.
    Some(unsafe { std::mem::transmute_copy(&proc) })
}

/// Documented pseudo-handle for `context`.
fn native_context(context: AwarenessContext) -> DPI_AWARENESS_CONTEXT {
    match context {
        AwarenessContext::Unaware => DPI_AWARENESS_CONTEXT_UNAWARE,
        AwarenessContext::SystemAware => DPI_AWARENESS_CONTEXT_SYSTEM_AWARE,
        AwarenessContext::PerMonitor => DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE,
        AwarenessContext::PerMonitorV2 => DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
        AwarenessContext::UnawareGdiScaled => DPI_AWARENESS_CONTEXT_UNAWARE_GDISCALED,
    }
}

fn native_process_awareness(awareness: ProcessAwareness) -> PROCESS_DPI_AWARENESS {
    match awareness {
        ProcessAwareness::Unaware => PROCESS_DPI_UNAWARE,
        ProcessAwareness::SystemAware => PROCESS_SYSTEM_DPI_AWARE,
        ProcessAwareness::PerMonitor => PROCESS_PER_MONITOR_DPI_AWARE,
    }
}

impl Win32Host {
    /// Resolve every version-gated entry point the controller may use.
    pub fn load() -> Self {
        let user32 = load_module(w!("user32.dll"));
        let shcore = load_module(w!("shcore.dll"));
        let ntdll = load_module(w!("ntdll.dll"));

        // SAFETY: each type alias mirrors the documented Win32 signature of the
        // export it is resolved against.
        unsafe {
            Self {
                rtl_get_version: resolve(ntdll, s!("RtlGetVersion")),
                get_dpi_for_system: resolve(user32, s!("GetDpiForSystem")),
                get_process_dpi_awareness: resolve(shcore, s!("GetProcessDpiAwareness")),
                set_process_dpi_awareness: resolve(shcore, s!("SetProcessDpiAwareness")),
                set_process_dpi_awareness_context: resolve(
                    user32,
                    s!("SetProcessDpiAwarenessContext"),
                ),
                get_thread_dpi_awareness_context: resolve(
                    user32,
                    s!("GetThreadDpiAwarenessContext"),
                ),
                set_thread_dpi_awareness_context: resolve(
                    user32,
                    s!("SetThreadDpiAwarenessContext"),
                ),
                are_dpi_awareness_contexts_equal: resolve(
                    user32,
                    s!("AreDpiAwarenessContextsEqual"),
                ),
            }
        }
    }

    /// Translate an opaque context handle into one of the five known contexts.
    fn translate(&self, handle: DPI_AWARENESS_CONTEXT) -> Option<AwarenessContext> {
        let equal = self.are_dpi_awareness_contexts_equal?;
        AwarenessContext::MATCH_ORDER.into_iter().find(|candidate| {
            // SAFETY: both arguments are context handles; the documented
            // pseudo-handles are always accepted by AreDpiAwarenessContextsEqual.
            unsafe { equal(handle, native_context(*candidate)) }.as_bool()
        })
    }
}

impl HostApi for Win32Host {
    fn os_version(&self) -> Option<OsVersion> {
        let rtl_get_version = self.rtl_get_version?;
        let mut info = OSVERSIONINFOW {
            dwOSVersionInfoSize: std::mem::size_of::<OSVERSIONINFOW>() as u32,
            ..Default::default()
        };
        // SAFETY: `info` is a properly sized OSVERSIONINFOW with its size field set.
        let status = unsafe { rtl_get_version(&mut info) };
        status.is_ok().then(|| {
            OsVersion::new(info.dwMajorVersion, info.dwMinorVersion, info.dwBuildNumber)
        })
    }

    fn device_dpi(&self) -> Option<u32> {
        if let Some(get_dpi_for_system) = self.get_dpi_for_system {
            // SAFETY: GetDpiForSystem takes no parameters.
            let dpi = unsafe { get_dpi_for_system() };
            if dpi != 0 {
                return Some(dpi);
            }
        }
        // SAFETY: a null window handle selects the screen DC, which is released
        // before returning.
        unsafe {
            let hdc = GetDC(HWND::default());
            if hdc == HDC::default() {
                return None;
            }
            let dpi = GetDeviceCaps(hdc, LOGPIXELSX);
            ReleaseDC(HWND::default(), hdc);
            u32::try_from(dpi).ok().filter(|d| *d != 0)
        }
    }

    fn is_process_dpi_aware(&self) -> Option<bool> {
        // SAFETY: no parameters.
        Some(unsafe { IsProcessDPIAware() }.as_bool())
    }

    fn set_process_dpi_aware(&self) -> Option<bool> {
        // SAFETY: no parameters; only meaningful before the first window exists.
        Some(unsafe { SetProcessDPIAware() }.as_bool())
    }

    fn process_awareness(&self) -> Option<ProcessAwareness> {
        let f = self.get_process_dpi_awareness?;
        let mut value = PROCESS_DPI_AWARENESS::default();
        // SAFETY: a null process handle means the current process; `value` is a
        // valid out pointer.
        let hr = unsafe { f(HANDLE::default(), &mut value) };
        if hr.is_err() {
            return None;
        }
        ProcessAwareness::from_raw(value.0)
    }

    fn set_process_awareness(&self, awareness: ProcessAwareness) -> Option<bool> {
        let f = self.set_process_dpi_awareness?;
        // SAFETY: the argument is one of the three documented enum values.
        Some(unsafe { f(native_process_awareness(awareness)) }.is_ok())
    }

    fn set_process_context(&self, context: AwarenessContext) -> Option<bool> {
        let f = self.set_process_dpi_awareness_context?;
        // SAFETY: the argument is one of the documented pseudo-handles.
        Some(unsafe { f(native_context(context)) }.as_bool())
    }

    fn thread_context(&self) -> Option<AwarenessContext> {
        let f = self.get_thread_dpi_awareness_context?;
        // SAFETY: no parameters; the handle is only compared, never freed.
        let handle = unsafe { f() };
        self.translate(handle)
    }

    fn set_thread_context(&self, context: AwarenessContext) -> Option<AwarenessContext> {
        let f = self.set_thread_dpi_awareness_context?;
        // SAFETY: the argument is one of the documented pseudo-handles; a null
        // return means the OS rejected it and nothing changed.
        let previous = unsafe { f(native_context(context)) };
        if previous == DPI_AWARENESS_CONTEXT::default() {
            return None;
        }
        self.translate(previous)
    }

    fn contexts_equal(&self, a: AwarenessContext, b: AwarenessContext) -> Option<bool> {
        let f = self.are_dpi_awareness_contexts_equal?;
        // SAFETY: both arguments are documented pseudo-handles.
        Some(unsafe { f(native_context(a), native_context(b)) }.as_bool())
    }
}
