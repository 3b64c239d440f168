//! Prompts and fixed user-facing texts
//!
//! This module holds the MiguelBot system instruction, the hidden trigger
//! utterance used to obtain the greeting, the help guide, and the fixed
//! messages shown when the remote service fails.

pub mod system_instruction;

pub use system_instruction::SYSTEM_INSTRUCTION;

/// Hidden utterance that primes a brand-new session
///
/// Sent once when no transcript exists. It is never displayed or persisted;
/// only the model's reply is.
pub const DEFAULT_TRIGGER_MESSAGE: &str = "Hola MiguelBot, estoy listo para iniciar el diagnóstico.";

/// Shown when the greeting cannot be obtained on a fresh start
pub const BOOTSTRAP_FAILURE_MESSAGE: &str =
    "Lo siento, hubo un error al conectar con MiguelBot. Por favor reinicia la aplicación.";

/// Appended as an assistant message when a submission fails
pub const SUBMIT_FAILURE_MESSAGE: &str =
    "Hubo un error de conexión. Intenta enviar tu respuesta nuevamente.";

/// Confirmation asked before erasing saved progress
pub const RESET_CONFIRMATION: &str =
    "¿Estás seguro de que quieres borrar todo tu progreso y empezar de nuevo?";

/// Status line shown while waiting for the model
pub const TYPING_INDICATOR: &str = "MiguelBot está escribiendo...";

/// Quick guide shown by `/help`
pub const HELP_GUIDE: &str = "\
**Guía Rápida**

**¿Qué es esto?**
Un simulacro rápido e inteligente para medir tu nivel real rumbo al EXANI-II 2026.

**¿Cómo funciona?**
1. **Datos:** MiguelBot te pedirá info básica para personalizar tus consejos.
2. **El Examen:** Recibirás 30 preguntas (Comprensión, Mate y Redacción) en bloques de 5.
3. **Respuestas:** Solo escribe la letra y número (ej: \"1-A, 2-C\") o solo las letras en orden.
4. **Resultados:** Al finalizar, obtendrás tu puntaje estimado y un plan de acción.

**Tips:**
- Sé honesto, no busques las respuestas.
- Tarda aprox. 10-15 minutos.
- Si te equivocas al escribir, MiguelBot te avisará.

Tu progreso se guarda automáticamente en este dispositivo.
Escribe /reset para borrar tu progreso y reiniciar, o /salir para terminar.";
