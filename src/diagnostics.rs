use ash::vk::{
    Bool32, DebugUtilsMessageSeverityFlagsEXT, DebugUtilsMessageTypeFlagsEXT,
    DebugUtilsMessengerCallbackDataEXT, DebugUtilsMessengerCreateInfoEXT, DebugUtilsMessengerEXT,
    FALSE, TRUE,
};
use ash::{Entry, Instance};
use std::borrow::Cow;
use std::ffi::{c_void, CStr};

use crate::error::{vk_check, BringUpError, Result};

type Callback = dyn Fn(DebugUtilsMessageSeverityFlagsEXT, DebugUtilsMessageTypeFlagsEXT, &str) -> bool;

/// Receives every validation, performance and general message.
///
/// The callback returns `true` to make the driver abort the call that
/// triggered the message.
pub struct MessageSink {
    // Boxed twice so the driver gets a thin, stable pointer.
    callback: Box<Box<Callback>>,
}

impl MessageSink {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(DebugUtilsMessageSeverityFlagsEXT, DebugUtilsMessageTypeFlagsEXT, &str) -> bool + 'static,
    {
        let callback: Box<Callback> = Box::new(callback);
        Self {
            callback: Box::new(callback),
        }
    }

    /// Forwards warnings and errors to the `vulkan` log target.
    pub fn logging() -> Self {
        Self::new(forward_to_log)
    }

    /// Messenger description pointing at this sink.
    ///
    /// Valid only while the sink is alive.
    pub fn create_info(&self) -> DebugUtilsMessengerCreateInfoEXT<'static> {
        DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(
                DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                    | DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(dispatch))
            .user_data(self.user_data())
    }

    fn user_data(&self) -> *mut c_void {
        &*self.callback as *const Box<Callback> as *mut c_void
    }
}

pub fn is_reported(severity: DebugUtilsMessageSeverityFlagsEXT) -> bool {
    severity.as_raw() >= DebugUtilsMessageSeverityFlagsEXT::WARNING.as_raw()
}

fn message_kind(message_type: DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if message_type.contains(DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "VALIDATION"
    } else if message_type.contains(DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "PERFORMANCE"
    } else if message_type.contains(DebugUtilsMessageTypeFlagsEXT::GENERAL) {
        "GENERAL"
    } else {
        "UNKNOWN"
    }
}

fn forward_to_log(
    severity: DebugUtilsMessageSeverityFlagsEXT,
    message_type: DebugUtilsMessageTypeFlagsEXT,
    message: &str,
) -> bool {
    if !is_reported(severity) {
        return false;
    }

    let kind = message_kind(message_type);
    if severity.contains(DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::error!(target: "vulkan", "[{kind}] {message}");
    } else {
        log::warn!(target: "vulkan", "[{kind}] {message}");
    }

    false
}

unsafe extern "system" fn dispatch(
    message_severity: DebugUtilsMessageSeverityFlagsEXT,
    message_type: DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const DebugUtilsMessengerCallbackDataEXT<'_>,
    user_data: *mut c_void,
) -> Bool32 {
    if user_data.is_null() {
        return FALSE;
    }

    let message = if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        Cow::from("")
    } else {
        CStr::from_ptr((*p_callback_data).p_message).to_string_lossy()
    };

    let callback = &*(user_data as *const Box<Callback>);
    if callback(message_severity, message_type, &message) {
        TRUE
    } else {
        FALSE
    }
}

/// A registered debug messenger.
pub struct DiagnosticsChannel {
    loader: ash::ext::debug_utils::Instance,
    handle: DebugUtilsMessengerEXT,
}

impl DiagnosticsChannel {
    /// Registers `sink` with the instance. The sink must outlive the channel.
    pub fn new(entry: &Entry, instance: &Instance, sink: &MessageSink) -> Result<Self> {
        for name in [
            c"vkCreateDebugUtilsMessengerEXT",
            c"vkDestroyDebugUtilsMessengerEXT",
        ] {
            let function = unsafe { entry.get_instance_proc_addr(instance.handle(), name.as_ptr()) };
            if function.is_none() {
                return Err(BringUpError::ExtensionUnavailable(
                    name.to_str().unwrap_or("VK_EXT_debug_utils"),
                ));
            }
        }

        let loader = ash::ext::debug_utils::Instance::new(entry, instance);
        let handle = vk_check("vkCreateDebugUtilsMessengerEXT", unsafe {
            loader.create_debug_utils_messenger(&sink.create_info(), None)
        });

        log::debug!("debug messenger registered");

        Ok(Self { loader, handle })
    }

    pub fn handle(&self) -> DebugUtilsMessengerEXT {
        self.handle
    }

    /// # Safety
    /// Must be called once, before the instance it was created from is
    /// destroyed.
    pub(crate) unsafe fn destroy(&self) {
        self.loader.destroy_debug_utils_messenger(self.handle, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn callback_data(text: &CStr) -> DebugUtilsMessengerCallbackDataEXT<'_> {
        let mut data = DebugUtilsMessengerCallbackDataEXT::default();
        data.p_message = text.as_ptr();
        data
    }

    #[test]
    fn only_warnings_and_errors_are_reported() {
        assert!(!is_reported(DebugUtilsMessageSeverityFlagsEXT::VERBOSE));
        assert!(!is_reported(DebugUtilsMessageSeverityFlagsEXT::INFO));
        assert!(is_reported(DebugUtilsMessageSeverityFlagsEXT::WARNING));
        assert!(is_reported(DebugUtilsMessageSeverityFlagsEXT::ERROR));
    }

    #[test]
    fn driver_messages_reach_the_sink() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = MessageSink::new({
            let seen = seen.clone();
            move |severity: DebugUtilsMessageSeverityFlagsEXT,
                  message_type: DebugUtilsMessageTypeFlagsEXT,
                  message: &str| {
                seen.borrow_mut().push((severity, message_type, message.to_owned()));
                false
            }
        });

        let text = c"vkCreateDevice: bad queue family";
        let data = callback_data(text);
        let result = unsafe {
            dispatch(
                DebugUtilsMessageSeverityFlagsEXT::ERROR,
                DebugUtilsMessageTypeFlagsEXT::VALIDATION,
                &data,
                sink.user_data(),
            )
        };

        assert_eq!(result, FALSE);
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, DebugUtilsMessageSeverityFlagsEXT::ERROR);
        assert_eq!(seen[0].1, DebugUtilsMessageTypeFlagsEXT::VALIDATION);
        assert_eq!(seen[0].2, "vkCreateDevice: bad queue family");
    }

    #[test]
    fn sink_can_request_abort() {
        let sink = MessageSink::new(|_, _, _| true);
        let data = callback_data(c"fatal");
        let result = unsafe {
            dispatch(
                DebugUtilsMessageSeverityFlagsEXT::ERROR,
                DebugUtilsMessageTypeFlagsEXT::GENERAL,
                &data,
                sink.user_data(),
            )
        };
        assert_eq!(result, TRUE);
    }

    #[test]
    fn logging_sink_never_aborts() {
        let sink = MessageSink::logging();
        for severity in [
            DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
            DebugUtilsMessageSeverityFlagsEXT::WARNING,
            DebugUtilsMessageSeverityFlagsEXT::ERROR,
        ] {
            let data = callback_data(c"message");
            let result = unsafe {
                dispatch(severity, DebugUtilsMessageTypeFlagsEXT::PERFORMANCE, &data, sink.user_data())
            };
            assert_eq!(result, FALSE);
        }
    }

    #[test]
    fn create_info_points_at_the_sink() {
        let sink = MessageSink::logging();
        let info = sink.create_info();

        assert!(info.pfn_user_callback.is_some());
        assert_eq!(info.p_user_data, sink.user_data());
        assert!(info.message_severity.contains(DebugUtilsMessageSeverityFlagsEXT::WARNING));
        assert!(info.message_type.contains(
            DebugUtilsMessageTypeFlagsEXT::GENERAL
                | DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
        ));
    }

    #[test]
    fn missing_message_text_is_empty() {
        let sink = MessageSink::new(|_, _, message| message.is_empty());
        let data = DebugUtilsMessengerCallbackDataEXT::default();
        let result = unsafe {
            dispatch(
                DebugUtilsMessageSeverityFlagsEXT::WARNING,
                DebugUtilsMessageTypeFlagsEXT::GENERAL,
                &data,
                sink.user_data(),
            )
        };
        assert_eq!(result, TRUE);
    }
}
