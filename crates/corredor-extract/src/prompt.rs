//! Extraction prompt construction.
//!
//! The prompt does the heavy lifting for currency normalization: Chilean
//! colloquial amounts ("lucas" = thousands, "palos" = millions) and UF/USD
//! amounts are converted to CLP once, at extraction time, using fixed
//! approximate rates. Display code never converts.

/// Field names the model must emit for every identified property, in the
/// order they are listed in the prompt. "Busco / Ofrezco" is deliberately
/// absent: polarity is recomputed by rules after parsing.
pub const PROMPT_FIELDS: &[&str] = &[
    "Tipo de Operacion",
    "Propiedad",
    "Region",
    "Ciudad",
    "Opcion Comuna",
    "Opcion Comuna 2",
    "Opcion Comuna 3",
    "Opcion Comuna 4",
    "Dormitorios",
    "Baños",
    "Estacionamiento",
    "Bodegas",
    "Valor",
    "Moneda",
    "Gastos Comunes",
    "Metros Cuadrados",
    "Telefono",
    "Correo Electronico",
];

/// Build the structured-extraction prompt for one inbound message.
pub fn build_extraction_prompt(message_text: &str, uf_rate_clp: u64, usd_rate_clp: u64) -> String {
    let fields = PROMPT_FIELDS.join(", ");
    format!(
        r#"Analiza el siguiente mensaje sobre propiedades inmobiliarias en Chile. El mensaje puede contener UNA o VARIAS propiedades.

Para CADA propiedad identificada:

PASO 1 — "Tipo de Operacion": asigna "Arriendo" (alquiler/renta), "Venta" (se está vendiendo) o "Compra" (se busca adquirir).

PASO 2 — "Propiedad": tipo de inmueble (ej: "Casa", "Departamento", "Oficina", "Local Comercial", "Terreno", "Parcela", "Bodega", "Estacionamiento").

PASO 3 — extrae los campos restantes: {fields}.

Reglas para "Valor" y "Moneda":
- "Valor" SIEMPRE debe ser un NÚMERO ENTERO en Pesos Chilenos (CLP), sin puntos ni comas.
- "lucas" = MILES de CLP (ej: "500 lucas" -> Valor: 500000, Moneda: "CLP").
- "palos" = MILLONES de CLP (ej: "5 palos" -> Valor: 5000000, Moneda: "CLP").
- UF a CLP: 1 UF = {uf_rate_clp} CLP (aprox.). Ej: "100 UF" -> Valor: {uf_example}, Moneda: "CLP (original UF)".
- USD a CLP: 1 USD = {usd_rate_clp} CLP (aprox.). Ej: "1000 USD" -> Valor: {usd_example}, Moneda: "CLP (original USD)".
- Si el valor ya está en CLP, Moneda: "CLP".

Otras reglas:
- Si un campo no se menciona, déjalo como string vacío "".
- Abreviaturas: "D"/"dorm" (Dormitorios), "B"/"baño" (Baños), "Stgo" (Santiago), "Est" (Estacionamiento).
- Comuna principal en "Opcion Comuna"; alternativas claras en "Opcion Comuna 2", 3 y 4.
- "Telefono"/"Correo Electronico": solo si están explícitos en el mensaje.

Formato de respuesta:
- UNA propiedad: un único objeto JSON.
- VARIAS propiedades: un ARRAY de objetos JSON.
- Cada objeto debe incluir TODAS las claves: {fields}.
- Responde SOLO con el JSON, sin texto adicional.

Ejemplo de mensaje: "Colegas, tengo para arriendo un depto en Providencia, 2D 1B, en 600 lucas. Por otro lado, ando buscando una oficina para comprar en Las Condes, sobre 100m2."

Ejemplo de respuesta:
[
  {{
    "Tipo de Operacion": "Arriendo", "Propiedad": "Departamento",
    "Region": "Metropolitana de Santiago", "Ciudad": "Santiago", "Opcion Comuna": "Providencia",
    "Opcion Comuna 2": "", "Opcion Comuna 3": "", "Opcion Comuna 4": "",
    "Dormitorios": "2", "Baños": "1", "Estacionamiento": "", "Bodegas": "",
    "Valor": "600000", "Moneda": "CLP", "Gastos Comunes": "", "Metros Cuadrados": "",
    "Telefono": "", "Correo Electronico": ""
  }},
  {{
    "Tipo de Operacion": "Compra", "Propiedad": "Oficina",
    "Region": "Metropolitana de Santiago", "Ciudad": "Santiago", "Opcion Comuna": "Las Condes",
    "Opcion Comuna 2": "", "Opcion Comuna 3": "", "Opcion Comuna 4": "",
    "Dormitorios": "", "Baños": "", "Estacionamiento": "", "Bodegas": "",
    "Valor": "", "Moneda": "", "Gastos Comunes": "", "Metros Cuadrados": "100",
    "Telefono": "", "Correo Electronico": ""
  }}
]

Mensaje a analizar: "{message_text}"

JSON extraído (objeto único o array de objetos):"#,
        fields = fields,
        uf_rate_clp = uf_rate_clp,
        usd_rate_clp = usd_rate_clp,
        uf_example = 100 * uf_rate_clp,
        usd_example = 1000 * usd_rate_clp,
        message_text = message_text,
    )
}
